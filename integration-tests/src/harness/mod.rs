mod fixtures;
pub mod tracing;

pub use fixtures::{LogDir, LogLine};
pub use tracing::{CapturedEvent, init_test_tracing};
