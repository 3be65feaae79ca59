use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use libris_chat::{DisplaySink, Session, Transport};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedReceiver;

/// Prints the reply as it streams in.
///
/// The session hands over the whole reply so far after each chunk; only the
/// part not yet printed is written.
pub struct TerminalSink<W: Write, E: Write> {
    out: W,
    err: E,
    printed: usize,
}

impl<W: Write, E: Write> TerminalSink<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err, printed: 0 }
    }

    fn end_reply(&mut self) {
        if self.printed > 0 {
            let _ = writeln!(self.out);
            self.printed = 0;
        }
        let _ = self.out.flush();
    }
}

// Display errors (a closed stdout) are not worth failing a chat over.
impl<W: Write, E: Write> DisplaySink for TerminalSink<W, E> {
    fn reply_started(&mut self) {
        self.printed = 0;
    }

    fn reply(&mut self, accumulated: &str) {
        if let Some(fresh) = accumulated.get(self.printed..) {
            let _ = write!(self.out, "{fresh}");
            let _ = self.out.flush();
        }
        self.printed = accumulated.len();
    }

    fn failure(&mut self, notice: &str) {
        self.end_reply();
        let _ = writeln!(self.err, "{notice}");
    }
}

/// Send every non-blank line of `input` as a message until end of input.
///
/// Each value received on `interrupts` aborts the reply being streamed. One
/// that arrives while no reply is in flight ends the chat instead.
pub async fn run<T: Transport>(
    session: &mut Session<T>,
    input: impl AsyncBufRead + Unpin,
    sink: &mut TerminalSink<impl Write, impl Write>,
    mut interrupts: UnboundedReceiver<()>,
) -> Result<()> {
    let canceller = session.canceller();
    let leave = async {
        while interrupts.recv().await.is_some() {
            if !canceller.cancel() {
                return;
            }
            tracing::debug!("Interrupted, reply cancelled");
        }
        // Nobody can interrupt any more.
        std::future::pending::<()>().await
    };
    tokio::select! {
        result = converse(session, input, sink) => result,
        () = leave => {
            tracing::info!("Interrupted while idle, leaving chat");
            Ok(())
        },
    }
}

async fn converse<T: Transport>(
    session: &mut Session<T>,
    input: impl AsyncBufRead + Unpin,
    sink: &mut TerminalSink<impl Write, impl Write>,
) -> Result<()> {
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.or_raise(|| ErrorKind::Io)? {
        if line.trim().is_empty() {
            continue;
        }
        // Failures were already shown to the user as a notice.
        if session.send(&line, &mut *sink).await.is_ok() {
            sink.end_reply();
        }
    }
    tracing::info!(turns = session.conversation().len(), "Chat input closed");
    Ok(())
}
