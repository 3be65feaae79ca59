use crate::decode::Utf8Decoder;
use crate::error::{ErrorKind, Result};
use crate::sink::DisplaySink;
use crate::transport::{ChatRequest, Transport};
use crate::turn::Conversation;
use futures::StreamExt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Aborts whatever send is in flight on the [`Session`] it came from.
///
/// Cheap to clone; every clone controls the same session. Cancelling when
/// nothing is in flight does nothing, and does not affect the next send.
#[derive(Debug, Clone, Default)]
pub struct Canceller {
    state: Arc<Mutex<CancelState>>,
}

#[derive(Debug, Default)]
struct CancelState {
    token: CancellationToken,
    in_flight: bool,
}

impl Canceller {
    /// Abort the send in flight, if any.
    ///
    /// Returns `true` if a send was running and has now been told to stop,
    /// `false` if the session was idle (or the send was already cancelled).
    pub fn cancel(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.in_flight || state.token.is_cancelled() {
            return false;
        }
        state.token.cancel();
        true
    }

    /// Install a fresh token for a new send and mark it in flight until the
    /// returned guard drops. Any token left over from an abandoned send is
    /// cancelled first.
    fn begin(&self) -> (CancellationToken, InFlight) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.token.cancel();
        state.token = CancellationToken::new();
        state.in_flight = true;
        (state.token.clone(), InFlight(self.clone()))
    }
}

/// Marks the session idle again when the send finishes or is dropped.
struct InFlight(Canceller);
impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.state.lock().unwrap_or_else(PoisonError::into_inner).in_flight = false;
    }
}

/// One chat conversation against one [`Transport`].
///
/// Each [`send`](Self::send) is a single request/response round-trip. Sends
/// never overlap (`&mut self`), and a send only touches the conversation log
/// once its reply has streamed to completion.
pub struct Session<T> {
    transport: T,
    conversation: Conversation,
    timeout: Option<Duration>,
    canceller: Canceller,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            conversation: Conversation::new(),
            timeout: None,
            canceller: Canceller::default(),
        }
    }

    /// Deadline for a whole send: connecting, and reading every chunk.
    pub fn with_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Handle for aborting the in-flight send from elsewhere (e.g. a Ctrl-C
    /// handler).
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Send `message` with the conversation so far, streaming the reply into
    /// `sink`, and return the complete reply.
    ///
    /// On success the conversation gains exactly two turns: the (trimmed)
    /// message, then the reply. On failure the sink gets exactly one
    /// [`notice`](ErrorKind::notice), the error is returned, and the
    /// conversation is left as it was.
    ///
    /// A blank message is rejected with
    /// [`EmptyMessage`](ErrorKind::EmptyMessage) before the sink or the
    /// transport see anything.
    #[instrument(skip_all, fields(transport = self.transport.name(), history = self.conversation.len()))]
    pub async fn send<S: DisplaySink + ?Sized>(&mut self, message: &str, sink: &mut S) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            exn::bail!(ErrorKind::EmptyMessage);
        }
        sink.user_message(message);
        let (token, _in_flight) = self.canceller.begin();
        match self.exchange(message, sink, &token).await {
            Ok(reply) => {
                self.conversation.push_exchange(message, reply.as_str());
                Ok(reply)
            },
            Err(err) => {
                tracing::warn!(error = %*err, retryable = err.is_retryable(), "Chat exchange failed");
                sink.failure(err.notice());
                Err(err)
            },
        }
    }

    async fn exchange<S: DisplaySink + ?Sized>(
        &self,
        message: &str,
        sink: &mut S,
        token: &CancellationToken,
    ) -> Result<String> {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let request = ChatRequest { message, conversation_history: self.conversation.turns() };
        let mut stream = guarded(self.transport.open(&request), token, deadline).await??;
        sink.reply_started();

        // Fold: every decoded chunk grows the accumulator, and the sink sees
        // the whole reply so far.
        let mut decoder = Utf8Decoder::default();
        let mut accumulated = String::new();
        let mut chunks = 0u64;
        while let Some(chunk) = guarded(stream.next(), token, deadline).await? {
            chunks += 1;
            let text = decoder.decode(&chunk?);
            if !text.is_empty() {
                accumulated.push_str(&text);
                sink.reply(&accumulated);
            }
        }
        let tail = decoder.finish();
        if !tail.is_empty() {
            accumulated.push_str(&tail);
            sink.reply(&accumulated);
        }
        tracing::debug!(chunks, bytes = accumulated.len(), "Reply stream complete");
        Ok(accumulated)
    }
}

/// Race `future` against cancellation and the deadline.
async fn guarded<F: Future>(future: F, token: &CancellationToken, deadline: Option<Instant>) -> Result<F::Output> {
    let expired = async {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => futures::future::pending::<()>().await,
        }
    };
    tokio::select! {
        biased;
        () = token.cancelled() => exn::bail!(ErrorKind::Cancelled),
        () = expired => exn::bail!(ErrorKind::Timeout),
        output = future => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, RecordedRequest, Script};
    use crate::turn::Turn;

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        User(String),
        Started,
        Reply(String),
        Failure(String),
    }

    #[derive(Default)]
    struct Recorder(Vec<Event>);
    impl Recorder {
        fn failures(&self) -> usize {
            self.0.iter().filter(|e| matches!(e, Event::Failure(_))).count()
        }
    }
    impl DisplaySink for Recorder {
        fn user_message(&mut self, message: &str) {
            self.0.push(Event::User(message.to_string()));
        }

        fn reply_started(&mut self) {
            self.0.push(Event::Started);
        }

        fn reply(&mut self, accumulated: &str) {
            self.0.push(Event::Reply(accumulated.to_string()));
        }

        fn failure(&mut self, notice: &str) {
            self.0.push(Event::Failure(notice.to_string()));
        }
    }

    fn session(scripts: impl IntoIterator<Item = Script>) -> Session<MockTransport> {
        Session::new(MockTransport::with_scripts(scripts))
    }

    #[tokio::test]
    async fn test_successful_send_folds_chunks() {
        let mut session = session([Script::reply(["Hel", "lo", " there"])]);
        let mut sink = Recorder::default();
        let reply = session.send("  hi  ", &mut sink).await.unwrap();
        assert_eq!(reply, "Hello there");
        assert_eq!(
            sink.0,
            [
                Event::User("hi".into()),
                Event::Started,
                Event::Reply("Hel".into()),
                Event::Reply("Hello".into()),
                Event::Reply("Hello there".into()),
            ]
        );
        assert_eq!(session.conversation().turns(), [Turn::user("hi"), Turn::assistant("Hello there")]);
    }

    #[tokio::test]
    async fn test_history_is_sent_with_next_message() {
        let mut session = session([Script::reply(["one"]), Script::reply(["two"])]);
        session.send("first", &mut ()).await.unwrap();
        session.send("second", &mut ()).await.unwrap();
        let requests = session.transport().requests().await;
        assert_eq!(
            requests,
            [
                RecordedRequest { message: "first".into(), conversation_history: vec![] },
                RecordedRequest {
                    message: "second".into(),
                    conversation_history: vec![Turn::user("first"), Turn::assistant("one")],
                },
            ]
        );
        assert_eq!(session.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_split_character_across_chunks() {
        let mut session = session([Script::Reply(vec![b"caf\xC3".to_vec(), b"\xA9".to_vec()])]);
        let mut sink = Recorder::default();
        assert_eq!(session.send("coffee?", &mut sink).await.unwrap(), "café");
        // The half character is held back, never shown.
        assert!(sink.0.contains(&Event::Reply("caf".into())));
        assert!(sink.0.contains(&Event::Reply("café".into())));
    }

    #[tokio::test]
    async fn test_empty_reply_still_completes_exchange() {
        let mut session = session([Script::Reply(vec![])]);
        assert_eq!(session.send("hello?", &mut ()).await.unwrap(), "");
        assert_eq!(session.conversation().turns(), [Turn::user("hello?"), Turn::assistant("")]);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_without_side_effects() {
        let mut session = session([]);
        let mut sink = Recorder::default();
        let err = session.send(" \n\t", &mut sink).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::EmptyMessage));
        assert!(sink.0.is_empty());
        assert!(session.transport().requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_status_failure_leaves_history_untouched() {
        let mut session = session([Script::reply(["ok"]), Script::Status(500, "Internal Server Error".into())]);
        session.send("first", &mut ()).await.unwrap();
        let before = session.conversation().clone();

        let mut sink = Recorder::default();
        let err = session.send("second", &mut sink).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Status { code: 500, .. }));
        assert_eq!(
            sink.0,
            [
                Event::User("second".into()),
                Event::Failure("Failed to get response from server. Please try again.".into())
            ]
        );
        assert_eq!(session.conversation(), &before);
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let mut session = session([Script::ConnectionFailure]);
        let mut sink = Recorder::default();
        let err = session.send("hi", &mut sink).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Network));
        assert_eq!(sink.failures(), 1);
        assert!(sink.0.contains(&Event::Failure("A network error occurred. Please try again.".into())));
        assert!(session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_appends_nothing() {
        let mut session = session([Script::BreakAfter(vec![b"partial ".to_vec(), b"reply".to_vec()])]);
        let mut sink = Recorder::default();
        let err = session.send("hi", &mut sink).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Network));
        // The partial reply was displayed, then exactly one notice.
        assert!(sink.0.contains(&Event::Reply("partial reply".into())));
        assert_eq!(sink.failures(), 1);
        assert!(matches!(sink.0.last(), Some(Event::Failure(_))));
        assert!(session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut session =
            session([Script::StallAfter(vec![b"thinking".to_vec()])]).with_timeout(Duration::from_millis(50));
        let mut sink = Recorder::default();
        let err = session.send("hi", &mut sink).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Timeout));
        assert_eq!(sink.failures(), 1);
        assert!(session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_in_flight_send() {
        let mut session = session([Script::StallAfter(vec![b"thinking".to_vec()]), Script::reply(["done"])]);
        let canceller = session.canceller();
        let mut sink = Recorder::default();
        let (result, ()) = tokio::join!(session.send("hi", &mut sink), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(canceller.cancel());
            // Already stopping; a second request has nothing left to abort.
            assert!(!canceller.cancel());
        });
        assert!(matches!(&*result.unwrap_err(), ErrorKind::Cancelled));
        assert_eq!(sink.failures(), 1);
        assert!(session.conversation().is_empty());

        // A fresh send is not affected by the earlier cancellation.
        assert_eq!(session.send("again", &mut ()).await.unwrap(), "done");
        assert_eq!(session.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_when_idle_does_not_poison_next_send() {
        let mut session = session([Script::reply(["fine"])]);
        assert!(!session.canceller().cancel());
        assert_eq!(session.send("hi", &mut ()).await.unwrap(), "fine");
        // Idle again once the reply has completed.
        assert!(!session.canceller().cancel());
    }
}
