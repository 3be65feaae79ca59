//! Incremental UTF-8 decoding for streamed reply bodies.
//!
//! Chunk boundaries are wherever the network put them, so a multi-byte
//! character can arrive split across two chunks. The decoder holds back an
//! incomplete trailing sequence until the next chunk completes it. Bytes that
//! can never form valid UTF-8 are replaced with U+FFFD.

use encoding_rs::{CoderResult, Decoder, UTF_8};
use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Streaming UTF-8 decoder.
///
/// Behaves like a browser `TextDecoder` fed with `{stream: true}`: a leading
/// byte order mark is dropped, and malformed input follows the WHATWG
/// replacement rules.
///
/// # Examples
///
/// ```
/// use libris_chat::Utf8Decoder;
///
/// let mut decoder = Utf8Decoder::default();
/// // "é" is 0xC3 0xA9
/// assert_eq!(decoder.decode(b"caf\xC3"), "caf");
/// assert_eq!(decoder.decode(b"\xA9!"), "é!");
/// assert_eq!(decoder.finish(), "");
/// ```
pub struct Utf8Decoder {
    inner: Decoder,
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self { inner: UTF_8.new_decoder() }
    }
}

impl Debug for Utf8Decoder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Utf8Decoder").field("encoding", &self.inner.encoding().name()).finish()
    }
}

impl Utf8Decoder {
    /// Decode as much of `chunk` (plus anything held back) as possible.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.feed(chunk, false)
    }

    /// Flush at end of stream. A dangling partial sequence becomes U+FFFD.
    ///
    /// The decoder is ready for a new stream afterwards.
    pub fn finish(&mut self) -> String {
        let tail = self.feed(&[], true);
        self.inner = UTF_8.new_decoder();
        tail
    }

    fn feed(&mut self, mut src: &[u8], last: bool) -> String {
        let mut out = String::new();
        loop {
            // Only `None` on usize overflow; fall back to growing in steps.
            let needed = self.inner.max_utf8_buffer_length(src.len()).unwrap_or(src.len() + 16);
            out.reserve(needed);
            let (result, read, _) = self.inner.decode_to_string(src, &mut out, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => return out,
                CoderResult::OutputFull => continue,
            }
        }
    }
}
