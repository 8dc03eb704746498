use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] judgeloops_dataset::DatasetError),

    #[error("Failed to create failure log {}: {source}", path.display())]
    FailureLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
