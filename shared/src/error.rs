//! Error types for the LINE webhook.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a webhook invocation.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid credentials/settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Webhook body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Webhook signature did not match the channel secret
    #[error("Signature error: {0}")]
    Signature(String),

    /// Shop search API unreachable, non-success, or malformed
    #[error("Search error: {0}")]
    Search(String),

    /// LINE reply API failure
    #[error("Reply error: {0}")]
    Reply(String),

    /// Invocation deadline reached before handling finished
    #[error("Deadline exceeded: {0}")]
    Deadline(String),
}

impl Error {
    /// Whether the caller should receive the generic localized error body
    /// with status 200 instead of a propagated invocation failure.
    pub fn is_rejected_request(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Signature(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_request_kinds() {
        assert!(Error::Parse("bad".to_string()).is_rejected_request());
        assert!(Error::Signature("bad".to_string()).is_rejected_request());
        assert!(!Error::Search("timeout".to_string()).is_rejected_request());
        assert!(!Error::Reply("401".to_string()).is_rejected_request());
        assert!(!Error::Deadline("500ms".to_string()).is_rejected_request());
    }
}
