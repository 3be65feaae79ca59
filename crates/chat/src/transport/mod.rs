//! Transport trait and implementations.
//!
//! A [`Transport`] knows how to deliver one [`ChatRequest`] to a chat
//! endpoint and hand back the reply body as a stream of raw byte chunks. It
//! does not decode, accumulate, or keep history: that is the job of
//! [`Session`](crate::Session).

#[cfg(feature = "http")]
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(feature = "http")]
pub use self::http::HttpTransport;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{MockTransport, RecordedRequest, Script};
use crate::error::Result;
use crate::turn::Turn;
use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

/// Reply body, chunk by chunk, in arrival order. Finite and not restartable.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send + 'static>>;

/// Request body sent to the chat endpoint.
///
/// ```
/// use libris_chat::{ChatRequest, Turn};
///
/// let history = [Turn::user("hi"), Turn::assistant("hello!")];
/// let request = ChatRequest { message: "how are you?", conversation_history: &history };
/// # let _ = request;
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub conversation_history: &'a [Turn],
}

/// Delivers a chat request and streams back the raw reply.
///
/// # Errors
/// Implementations report a non-success response as
/// [`Status`](crate::error::ErrorKind::Status) and any connection or read
/// failure (including one in the middle of the stream) as
/// [`Network`](crate::error::ErrorKind::Network).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name of the transport, for logging only.
    fn name(&self) -> &str;

    /// Send `request` and return the reply body once the endpoint has
    /// accepted it.
    async fn open(&self, request: &ChatRequest<'_>) -> Result<ChunkStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let history = [Turn::user("hello"), Turn::assistant("hi there")];
        let request = ChatRequest { message: "how are you?", conversation_history: &history };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            serde_json::json!({
                "message": "how are you?",
                "conversation_history": [
                    {"role": "user", "content": "hello"},
                    {"role": "assistant", "content": "hi there"},
                ],
            })
        );
    }
}
