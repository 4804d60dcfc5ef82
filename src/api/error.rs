//! API Error Types

use thiserror::Error;

/// Errors that can occur when talking to the workshop API
///
/// The dashboard treats every variant the same way (an empty result), but
/// keeps them apart for logging and for the search toast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    /// The response body was not the expected JSON
    #[error("Parse error: {0}")]
    Decode(String),

    /// The response carried an `error` field
    #[error("API error: {0}")]
    Reported(String),

    /// The response lacked the array the endpoint should return
    #[error("Response missing `{0}` field")]
    MissingField(&'static str),
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
