//! Chat Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Transport failures never reach the display layer as raw errors:
//! [`Session::send`](crate::Session::send) turns each one into a single
//! [`notice`](ErrorKind::notice) for the sink, and still returns the error to
//! the caller for logging or retry decisions.

use derive_more::{Display, Error};

/// A chat error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for chat operations.
pub type Result<T> = std::result::Result<T, Error>;

const NOTICE_STATUS: &str = "Failed to get response from server. Please try again.";
const NOTICE_NETWORK: &str = "A network error occurred. Please try again.";
const NOTICE_TIMEOUT: &str = "The server took too long to respond. Please try again.";
const NOTICE_CANCELLED: &str = "Request cancelled.";
const NOTICE_INVALID: &str = "The chat endpoint is misconfigured.";
const NOTICE_EMPTY: &str = "Please enter a message.";

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing to send after trimming whitespace.
    #[display("message is empty")]
    EmptyMessage,
    /// The endpoint answered with a non-success status.
    #[display("server responded with {code} {reason}")]
    Status { code: u16, reason: String },
    /// Connecting, sending, or reading the reply stream failed.
    #[display("network error")]
    Network,
    /// The reply did not finish before the configured deadline.
    #[display("timed out waiting for reply")]
    Timeout,
    /// The in-flight request was aborted through a
    /// [`Canceller`](crate::Canceller).
    #[display("request cancelled")]
    Cancelled,
    /// Endpoint URL could not be parsed.
    #[display("invalid endpoint: {_0}")]
    InvalidEndpoint(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network | Self::Timeout => true,
            Self::Status { code, .. } => *code >= 500,
            Self::EmptyMessage | Self::Cancelled | Self::InvalidEndpoint(_) => false,
        }
    }

    /// The single user-facing message shown when a send fails.
    pub fn notice(&self) -> &'static str {
        match self {
            Self::Status { .. } => NOTICE_STATUS,
            Self::Network => NOTICE_NETWORK,
            Self::Timeout => NOTICE_TIMEOUT,
            Self::Cancelled => NOTICE_CANCELLED,
            Self::InvalidEndpoint(_) => NOTICE_INVALID,
            Self::EmptyMessage => NOTICE_EMPTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn error_kind_display() {
        let status = ErrorKind::Status { code: 500, reason: "Internal Server Error".into() };
        assert_eq!(status.to_string(), "server responded with 500 Internal Server Error");
        assert_eq!(ErrorKind::InvalidEndpoint("nope".into()).to_string(), "invalid endpoint: nope");
    }

    #[rstest]
    #[case(ErrorKind::Network, true)]
    #[case(ErrorKind::Timeout, true)]
    #[case(ErrorKind::Status { code: 503, reason: "Service Unavailable".into() }, true)]
    #[case(ErrorKind::Status { code: 404, reason: "Not Found".into() }, false)]
    #[case(ErrorKind::Cancelled, false)]
    #[case(ErrorKind::EmptyMessage, false)]
    fn error_kind_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }

    #[rstest]
    #[case(ErrorKind::Status { code: 502, reason: String::new() }, NOTICE_STATUS)]
    #[case(ErrorKind::Network, NOTICE_NETWORK)]
    #[case(ErrorKind::Timeout, NOTICE_TIMEOUT)]
    #[case(ErrorKind::Cancelled, NOTICE_CANCELLED)]
    #[case(ErrorKind::InvalidEndpoint("nope".into()), NOTICE_INVALID)]
    #[case(ErrorKind::EmptyMessage, NOTICE_EMPTY)]
    fn notices_match_failure_class(#[case] kind: ErrorKind, #[case] expected: &str) {
        assert_eq!(kind.notice(), expected);
    }
}
