//! HTTP transport backed by `reqwest`.

use super::{ChatRequest, ChunkStream, Transport};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use futures::StreamExt;
use reqwest::{Client, Url};
use tracing::instrument;

/// POSTs the request as JSON and streams the response body.
///
/// No client-wide timeout is set: a long reply is expected to keep the
/// connection open for a while. Deadlines are enforced per send by
/// [`Session`](crate::Session).
pub struct HttpTransport {
    name: String,
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport for `endpoint`, e.g. `http://localhost:8000/chat`.
    ///
    /// Returns [`InvalidEndpoint`](ErrorKind::InvalidEndpoint) if the URL
    /// does not parse.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self> {
        let endpoint = endpoint.as_ref();
        let url = Url::parse(endpoint).or_raise(|| ErrorKind::InvalidEndpoint(endpoint.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            exn::bail!(ErrorKind::InvalidEndpoint(endpoint.to_string()));
        }
        let client = Client::builder().build().or_raise(|| ErrorKind::Network)?;
        Ok(Self {
            name: url.host_str().unwrap_or("http").to_string(),
            client,
            endpoint: url,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint, history = request.conversation_history.len()))]
    async fn open(&self, request: &ChatRequest<'_>) -> Result<ChunkStream> {
        let response =
            self.client.post(self.endpoint.clone()).json(request).send().await.or_raise(|| ErrorKind::Network)?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Chat endpoint responded");
        if !status.is_success() {
            exn::bail!(ErrorKind::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(Box::pin(
            response.bytes_stream().map(|chunk| chunk.map(|bytes| bytes.to_vec()).or_raise(|| ErrorKind::Network)),
        ))
    }
}
