//! Delta Decoder: turns framed NDJSON lines into cumulative reply text.
//!
//! Each line of a streamed generation response is a small JSON object:
//!
//! ```text
//! {"response":"Hi","done":false}
//! {"response":" there","done":false}
//! {"response":"!","done":true}
//! ```
//!
//! The decoder appends every non-empty fragment to a running accumulator
//! and hands the *whole* accumulated text to the delta callback. Consumers
//! render snapshots, so they never need to diff.

use serde::{Deserialize, Deserializer};

/// One decoded protocol record.
///
/// Missing or `null` fields decode to their defaults, so `{}` is a valid,
/// empty, non-final record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamRecord {
    /// Text fragment carried by this record.
    #[serde(default, rename = "response", deserialize_with = "null_as_default")]
    pub fragment: String,
    /// Whether the service reports the generation as complete.
    #[serde(default, rename = "done", deserialize_with = "null_as_default")]
    pub is_final: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StreamRecord {
    /// Parse a single line. Returns `None` for blank or malformed lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!(error = %err, line, "skipping malformed stream line");
                None
            }
        }
    }
}

/// Accumulating decoder for one response stream.
#[derive(Debug, Default)]
pub struct DeltaDecoder {
    /// Every fragment received so far, concatenated.
    accumulated: String,
    /// Set once a record reports completion.
    finished: bool,
    /// Lines that failed to parse.
    skipped: usize,
}

impl DeltaDecoder {
    /// Create a decoder with an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one complete line.
    ///
    /// Invokes `on_delta` with the full accumulated text when the line
    /// carried a non-empty fragment. Returns `true` once the stream is
    /// complete; lines fed after that are ignored.
    pub fn feed_line<F>(&mut self, line: &str, on_delta: &mut F) -> bool
    where
        F: FnMut(&str) + ?Sized,
    {
        if self.finished {
            return true;
        }

        let Some(record) = StreamRecord::parse(line) else {
            if !line.trim().is_empty() {
                self.skipped += 1;
            }
            return false;
        };

        if !record.fragment.is_empty() {
            self.accumulated.push_str(&record.fragment);
            on_delta(&self.accumulated);
        }

        self.finished = record.is_final;
        self.finished
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.accumulated
    }

    /// Whether a final record has been seen.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of non-blank lines discarded as malformed.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Consume the decoder, yielding the accumulated text.
    pub fn into_text(self) -> String {
        self.accumulated
    }
}
