/// Display-side consumer of a [`Session::send`](crate::Session::send).
///
/// During one send the sink sees, in order:
/// 1. [`user_message`](Self::user_message) once, before anything is sent;
/// 2. [`reply_started`](Self::reply_started) once the endpoint accepts the
///    request;
/// 3. [`reply`](Self::reply) after every decoded chunk, with the whole reply
///    so far;
/// 4. [`failure`](Self::failure) at most once, if the send fails at any point
///    (possibly after some reply text has already been shown).
pub trait DisplaySink {
    fn user_message(&mut self, _message: &str) {}

    fn reply_started(&mut self) {}

    fn reply(&mut self, accumulated: &str);

    fn failure(&mut self, notice: &str);
}

/// Discards everything.
impl DisplaySink for () {
    fn reply(&mut self, _accumulated: &str) {}

    fn failure(&mut self, _notice: &str) {}
}
