use qrandom_core::{PoolError, SourceError};

/// Anything a subcommand can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),

    #[error("output: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding status: {0}")]
    Json(#[from] serde_json::Error),
}
