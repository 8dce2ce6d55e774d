mod filter;
#[cfg(test)]
mod tests;

pub use filter::*;
