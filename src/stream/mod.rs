//! Streamed response decoding.
//!
//! Generation responses arrive as newline-delimited JSON over a chunked
//! body. Decoding is split into two stages:
//!
//! 1. [`LineFramer`] turns arbitrary byte chunks into complete lines.
//! 2. [`DeltaDecoder`] parses each line and accumulates text fragments.
//!
//! [`decode_reader`] wires both stages to any [`std::io::Read`].

mod decoder;
mod framer;

pub use decoder::{DeltaDecoder, StreamRecord};
pub use framer::LineFramer;

use std::io::{ErrorKind, Read};

/// Size of a single read from the response body.
pub const READ_CHUNK: usize = 2048;

/// Drive a reader through framing and decoding until completion or EOF.
///
/// Returns the accumulated text together with the read error that cut the
/// stream short, if any. Text decoded before the error is preserved.
pub fn decode_reader<R, F>(mut reader: R, on_delta: &mut F) -> (String, Option<std::io::Error>)
where
    R: Read,
    F: FnMut(&str) + ?Sized,
{
    let mut framer = LineFramer::new();
    let mut decoder = DeltaDecoder::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return (decoder.into_text(), Some(err)),
        };

        for line in framer.push(&buf[..read]) {
            if decoder.feed_line(&line, &mut *on_delta) {
                return (decoder.into_text(), None);
            }
        }
    }

    if let Some(tail) = framer.finish() {
        decoder.feed_line(&tail, &mut *on_delta);
    }
    if !decoder.is_finished() {
        tracing::debug!(chars = decoder.text().len(), "stream ended without a final record");
    }
    (decoder.into_text(), None)
}
