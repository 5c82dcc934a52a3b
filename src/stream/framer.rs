//! Line Framer: splits a live byte stream into complete lines.
//!
//! Chunk boundaries are arbitrary. A record may arrive split across two
//! reads, or several records may arrive in one read. The framer keeps the
//! trailing fragment of every chunk until the next newline shows up.
//!
//! Splitting happens on raw bytes so a multi-byte UTF-8 sequence that
//! straddles a read boundary is reassembled before it is decoded.

/// Incremental newline framer.
///
/// Never rejects input. Blank lines are passed through untouched; deciding
/// what a line means is the decoder's job.
#[derive(Debug, Default, Clone)]
pub struct LineFramer {
    /// Bytes received after the last newline.
    pending: Vec<u8>,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and collect every line it completes, in order.
    ///
    /// Returns an empty vector when the chunk contains no newline; the
    /// bytes are kept for the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        // `complete` ends with '\n', so the final split piece is always empty.
        let mut lines: Vec<String> = complete
            .split(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect();
        lines.pop();
        lines
    }

    /// Convenience wrapper for text chunks.
    pub fn push_str(&mut self, chunk: &str) -> Vec<String> {
        self.push(chunk.as_bytes())
    }

    /// Flush the unterminated tail at end of stream.
    ///
    /// Returns `None` when the stream ended exactly on a newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let tail = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&tail).into_owned())
    }

    /// Number of bytes waiting for a newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame `input` using the given chunk sizes and rebuild the stream.
    fn reframe(input: &str, sizes: &[usize]) -> String {
        let bytes = input.as_bytes();
        let mut framer = LineFramer::new();
        let mut out = String::new();
        let mut offset = 0;
        let mut i = 0;

        while offset < bytes.len() {
            let size = sizes[i % sizes.len()].max(1);
            let end = (offset + size).min(bytes.len());
            for line in framer.push(&bytes[offset..end]) {
                out.push_str(&line);
                out.push('\n');
            }
            offset = end;
            i += 1;
        }
        if let Some(tail) = framer.finish() {
            out.push_str(&tail);
        }
        out
    }

    #[test]
    fn test_framer_no_newline_waits() {
        let mut framer = LineFramer::new();
        assert!(framer.push_str("{\"response\":\"Hi").is_empty());
        assert_eq!(framer.pending_len(), 15);

        let lines = framer.push_str("\"}\n");
        assert_eq!(lines, vec!["{\"response\":\"Hi\"}".to_string()]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_framer_multiple_lines_in_one_chunk() {
        let mut framer = LineFramer::new();
        let lines = framer.push_str("a\nb\nc");
        assert_eq!(lines, vec!["a", "b"]);
        assert_eq!(framer.finish().as_deref(), Some("c"));
    }

    #[test]
    fn test_framer_blank_lines_pass_through() {
        let mut framer = LineFramer::new();
        let lines = framer.push_str("a\n\n\nb\n");
        assert_eq!(lines, vec!["a", "", "", "b"]);
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_framer_round_trip_any_split() {
        let source = "{\"response\":\"Hi\",\"done\":false}\n\n{\"response\":\" there\",\"done\":false}\n{\"done\":true}";
        for sizes in [&[1][..], &[2, 3], &[7], &[64], &[5, 1, 13]] {
            assert_eq!(reframe(source, sizes), source, "sizes {sizes:?}");
        }

        let terminated = "one\ntwo\n";
        for sizes in [&[1][..], &[3], &[100]] {
            assert_eq!(reframe(terminated, sizes), terminated);
        }
    }

    #[test]
    fn test_framer_reassembles_split_utf8() {
        let source = "caf\u{e9} \u{1f600}\n";
        let bytes = source.as_bytes();
        let mut framer = LineFramer::new();
        let mut lines = Vec::new();
        for b in bytes {
            lines.extend(framer.push(std::slice::from_ref(b)));
        }
        assert_eq!(lines, vec!["caf\u{e9} \u{1f600}".to_string()]);
    }
}
