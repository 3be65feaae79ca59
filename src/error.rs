//! CLI Error Types
//!
//! Errors from the library crates are raised into these kinds with
//! [`exn::ResultExt::or_raise`], keeping the original error as a child.

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not set up chat transport")]
    Chat,
    #[display("could not start async runtime")]
    Runtime,
    #[display("I/O error")]
    Io,
}
