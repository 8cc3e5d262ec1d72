//! Page error types
//!
//! Nothing here is fatal to the page: every variant degrades to "no visible
//! effect" or a dismissible notification at the call site.

use thiserror::Error;

/// Page error type
#[derive(Debug, Error)]
pub enum SiteError {
    /// Lightbox asked to open an image that does not exist
    #[error("gallery index {index} out of range (gallery has {len} items)")]
    InvalidGalleryIndex { index: usize, len: usize },

    /// Required inquiry fields missing or malformed
    #[error("validation failed: {}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    /// Backend could not receive the inquiry
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// Backend received the inquiry and refused it
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    /// A submission is already pending
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    /// Page description is inconsistent
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Page description could not be parsed
    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SiteError {
    /// Whether the user can retry without changing anything
    pub fn is_retryable(&self) -> bool {
        matches!(self, SiteError::SubmissionFailed(_) | SiteError::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = SiteError::ValidationFailed(vec!["name".into(), "phone".into()]);
        assert_eq!(err.to_string(), "validation failed: name, phone");
    }

    #[test]
    fn test_retryable() {
        assert!(SiteError::SubmissionFailed("timeout".into()).is_retryable());
        assert!(!SiteError::SubmissionRejected("HTTP 422".into()).is_retryable());
        assert!(!SiteError::ValidationFailed(vec![]).is_retryable());
        assert!(!SiteError::InvalidGalleryIndex { index: 3, len: 2 }.is_retryable());
    }
}
