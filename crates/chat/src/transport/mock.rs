//! Scripted transport for testing.

use super::{ChatRequest, ChunkStream, Transport};
use crate::error::{Error, ErrorKind, Result};
use crate::turn::Turn;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// What the mock does for one request.
#[derive(Debug, Clone)]
pub enum Script {
    /// Accept and stream these chunks, then end.
    Reply(Vec<Vec<u8>>),
    /// Reject with a non-success status.
    Status(u16, String),
    /// Fail before any response arrives.
    ConnectionFailure,
    /// Accept, stream these chunks, then fail mid-stream.
    BreakAfter(Vec<Vec<u8>>),
    /// Accept, stream these chunks, then never finish.
    StallAfter(Vec<Vec<u8>>),
}
impl Script {
    /// Convenience for a reply made of text chunks.
    pub fn reply<S: AsRef<str>>(chunks: impl IntoIterator<Item = S>) -> Self {
        Self::Reply(chunks.into_iter().map(|c| c.as_ref().as_bytes().to_vec()).collect())
    }
}

/// Owned copy of a [`ChatRequest`] the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub message: String,
    pub conversation_history: Vec<Turn>,
}

/// In-memory transport for tests.
///
/// Scripts are consumed in order, one per request. Every request is
/// recorded so tests can assert on what would have gone over the wire.
pub struct MockTransport {
    name: String,
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn with_scripts(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            name: "mock".to_string(),
            scripts: Mutex::new(scripts.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue another script after the existing ones.
    pub async fn push(&self, script: Script) {
        self.scripts.lock().await.push_back(script);
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}
impl Default for MockTransport {
    fn default() -> Self {
        Self::with_scripts([])
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self, request: &ChatRequest<'_>) -> Result<ChunkStream> {
        self.requests.lock().await.push(RecordedRequest {
            message: request.message.to_string(),
            conversation_history: request.conversation_history.to_vec(),
        });
        let Some(script) = self.scripts.lock().await.pop_front() else {
            // The panic here is DELIBERATE. MockTransport is intended to be
            // used in tests; a request nobody scripted is a broken test.
            panic!("MockTransport: no script left for message {:?}", request.message);
        };
        let (chunks, ending) = match script {
            Script::Status(code, reason) => exn::bail!(ErrorKind::Status { code, reason }),
            Script::ConnectionFailure => exn::bail!(ErrorKind::Network),
            Script::Reply(chunks) => (chunks, Ending::Complete),
            Script::BreakAfter(chunks) => (chunks, Ending::Break),
            Script::StallAfter(chunks) => (chunks, Ending::Stall),
        };
        Ok(Box::pin(stream! {
            for chunk in chunks {
                yield Ok::<_, Error>(chunk);
            }
            match ending {
                Ending::Complete => {},
                Ending::Break => {
                    yield Err(exn::Exn::from(ErrorKind::Network));
                },
                Ending::Stall => futures::future::pending::<()>().await,
            }
        }))
    }
}

enum Ending {
    Complete,
    Break,
    Stall,
}
