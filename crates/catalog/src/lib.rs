//! In-memory book catalog.
//!
//! A [`Catalog`] owns a set of [`Entry`] values keyed by a unique identifier
//! (an ISBN, usually) and tracks whether each one is on the shelf or checked
//! out. There is no persistence and no internal locking; the caller owns the
//! catalog and decides how long it lives.
//!
//! Faults ([`DuplicateIdentifier`](error::ErrorKind::DuplicateIdentifier),
//! [`NotFound`](error::ErrorKind::NotFound)) are returned as errors. Asking to
//! borrow a book that is already out, or to return one that never left, is a
//! business rule rather than a fault and comes back as a no-op
//! [`BorrowOutcome`] / [`ReturnOutcome`].

mod catalog;
mod entry;
pub mod error;

pub use crate::catalog::{BorrowOutcome, Catalog, ReturnOutcome};
pub use crate::entry::{Entry, EntryState};
