use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds of the inference pipeline.
///
/// Every error propagates to the caller as-is; the pipeline never retries,
/// recovers, or substitutes a default answer.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing feature fields, or a feature-vector shape the
    /// classifier cannot accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A model artifact is missing, unreadable, or fails validation.
    #[error("model artifact unavailable: {0}")]
    ModelUnavailable(String),

    /// No illustration could be produced for the predicted class.
    #[error("illustration unavailable: {0}")]
    AssetUnavailable(String),

    /// The deployment configuration file is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Writing classified observations to CSV failed.
    #[error("export failed: {0}")]
    Export(String),
}
