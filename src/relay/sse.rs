//! Incremental SSE decoder for planner status streams.
//!
//! Only `data:` fields matter here: consecutive data lines of one event are
//! joined with `\n` and the event is emitted on the blank line that ends it.
//! Comments (`:`) and other fields are skipped.
//!
//! A line longer than the configured cap is discarded together with the
//! event it belongs to; the decoder never holds more than one capped line.

/// Longest accepted line, in bytes, unless overridden.
pub const DEFAULT_MAX_LINE: usize = 64 * 1024;

/// Stateful decoder fed with arbitrary chunk boundaries.
#[derive(Debug)]
pub struct SseDecoder {
    /// Bytes of the current, not yet terminated line.
    buffer: Vec<u8>,
    data: Vec<String>,
    max_line: usize,
    /// Skipping the rest of an oversized line until its newline.
    discarding: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE)
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            data: Vec::new(),
            max_line,
            discarding: false,
        }
    }

    /// Feed one chunk and return the payloads of every event it completed.
    ///
    /// Only the new chunk is scanned for line breaks; bytes already buffered
    /// are known to contain none.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut payloads = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if self.buffer.len() + head.len() > self.max_line {
                self.drop_oversized(self.buffer.len() + head.len());
                self.discarding = false;
                continue;
            }

            self.buffer.extend_from_slice(head);
            let line = std::mem::take(&mut self.buffer);
            if let Some(payload) = self.process_line(&line) {
                payloads.push(payload);
            }
        }

        if !self.discarding && !rest.is_empty() {
            if self.buffer.len() + rest.len() > self.max_line {
                self.drop_oversized(self.buffer.len() + rest.len());
            } else {
                self.buffer.extend_from_slice(rest);
            }
        }
        payloads
    }

    /// Forget the pending line and the event it was part of.
    fn drop_oversized(&mut self, len: usize) {
        tracing::warn!(
            len,
            max_line = self.max_line,
            "Dropping oversized status line"
        );
        self.buffer = Vec::new();
        self.data.clear();
        self.discarding = true;
    }

    fn process_line(&mut self, line: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(line);
        let line = line.strip_suffix('\r').unwrap_or(&line);

        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            let payload = self.data.join("\n");
            self.data.clear();
            return Some(payload);
        }

        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            self.data.push(value.to_string());
        }
        None
    }
}
