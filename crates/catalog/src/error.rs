//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Borrowing a book that is already out, or returning one that never left,
//! are **not** errors. Those are reported through
//! [`BorrowOutcome`](crate::BorrowOutcome) and
//! [`ReturnOutcome`](crate::ReturnOutcome).

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An entry with this identifier is already catalogued. Pick another
    /// identifier; the existing entry was not modified.
    #[display("duplicate identifier: {_0}")]
    DuplicateIdentifier(#[error(not(source))] String),
    /// No entry is catalogued under this identifier.
    #[display("entry not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Identifier is empty (or only whitespace).
    #[display("invalid identifier: {_0:?}")]
    InvalidIdentifier(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Catalog operations are synchronous and in-memory; retrying the same
    /// call against the same catalog always gives the same answer.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::DuplicateIdentifier("111".into()).to_string(), "duplicate identifier: 111");
        assert_eq!(ErrorKind::NotFound("222".into()).to_string(), "entry not found: 222");
        assert_eq!(ErrorKind::InvalidIdentifier("  ".into()).to_string(), "invalid identifier: \"  \"");
    }

    #[test]
    fn error_kind_never_retryable() {
        assert!(!ErrorKind::NotFound("x".into()).is_retryable());
        assert!(!ErrorKind::DuplicateIdentifier("x".into()).is_retryable());
    }
}
