//! Streaming chat client.
//!
//! A [`Session`] sends one message (plus the conversation so far) through a
//! [`Transport`], folds the streamed reply into a [`DisplaySink`] chunk by
//! chunk, and records the completed round-trip in its [`Conversation`].
//!
//! Transports:
//! - [`HttpTransport`] (feature `http`): JSON `POST` to a `/chat` endpoint
//!   that answers with a streamed plain-text body.
//! - [`MockTransport`] (feature `mock`): scripted replies and failures, for
//!   tests in this and other crates.
//!
//! Failures are all-or-nothing: a send that fails for any reason (status,
//! network, timeout, cancellation) shows one notice and leaves the
//! conversation exactly as it was.

mod decode;
pub mod error;
mod session;
mod sink;
pub mod transport;
mod turn;

pub use crate::decode::Utf8Decoder;
pub use crate::session::{Canceller, Session};
pub use crate::sink::DisplaySink;
#[cfg(feature = "http")]
pub use crate::transport::HttpTransport;
pub use crate::transport::{ChatRequest, ChunkStream, Transport};
#[cfg(any(test, feature = "mock"))]
pub use crate::transport::{MockTransport, RecordedRequest, Script};
pub use crate::turn::{Conversation, Role, Turn};
