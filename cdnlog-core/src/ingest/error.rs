use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read log source {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngestError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }
}
