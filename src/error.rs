/// Error types shared across the crate
use aws_sdk_sts::error::SdkError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration, talking to AWS or
/// handling identity.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A remote AWS API call failed
    #[error("failed API (message: {message:?}, retryable: {retryable:?})")]
    Api { message: String, retryable: bool },

    /// The inventory snapshot could not be read or decoded
    #[error("inventory error: {0}")]
    Inventory(String),

    /// Schedule values failed validation or could not be (de)serialized
    #[error("invalid schedule: {0}")]
    Schedule(String),

    /// OAuth or Graph failures
    #[error("authentication error: {0}")]
    Auth(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds an `Api` error from an SDK failure, keeping the retryable hint.
    pub fn from_sdk<E, R>(context: &str, e: &SdkError<E, R>) -> Self
    where
        E: std::fmt::Debug,
        R: std::fmt::Debug,
    {
        Error::Api {
            message: format!("{context} {e:?}"),
            retryable: is_sdk_err_retryable(e),
        }
    }

    /// Returns if the error is retryable.
    #[inline]
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Error::Api { retryable: true, .. })
    }
}

#[inline]
pub fn is_sdk_err_retryable<E, R>(e: &SdkError<E, R>) -> bool {
    match e {
        SdkError::TimeoutError(_) | SdkError::ResponseError(_) => true,
        SdkError::DispatchFailure(e) => e.is_timeout() || e.is_io(),
        _ => false,
    }
}
