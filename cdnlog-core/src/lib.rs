pub mod analytics;
pub mod conf;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod window;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use pipeline::{AnalyzeError, AnalyzeOptions, analyze_batch, analyze_sources};
