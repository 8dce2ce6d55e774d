mod entry;
mod failure;

pub use entry::*;
pub use failure::*;
