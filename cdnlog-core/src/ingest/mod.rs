//! Reading raw log sources from disk and writing parsed records back out.

mod error;
mod records;
mod source;
#[cfg(test)]
mod tests;

pub use error::IngestError;
pub use records::*;
pub use source::*;
