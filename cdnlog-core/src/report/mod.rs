//! Report assembly and rendering.
//!
//! Sections arrive already rounded, so JSON and console output always agree
//! numerically.

mod assemble;
mod format;
mod text;

#[cfg(test)]
mod tests;

pub use assemble::*;
pub use format::*;
pub use text::render_text;
