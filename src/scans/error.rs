use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced at the scan repository boundary. None of them are
/// fatal; callers turn them into a failure notice.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("remote store error: {0:#}")]
    Remote(anyhow::Error),

    #[error("local cache error: {0:#}")]
    Cache(anyhow::Error),

    #[error("scan {0} not found")]
    NotFound(Uuid),

    #[error("invalid scan: {0}")]
    Invalid(String),
}
