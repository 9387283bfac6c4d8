use std::collections::VecDeque;

/// Reassembles transport fragments into newline-terminated lines
///
/// Bytes are buffered until a `\n` arrives, so a line (or a multi-byte UTF-8
/// character) split across any number of fragments comes out whole. Only the
/// `\n` terminator is removed; everything else is returned byte-for-byte.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    carry: VecDeque<u8>,
    /// Leading bytes of `carry` already known to hold no newline
    scanned: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            carry: VecDeque::with_capacity(capacity),
            scanned: 0,
        }
    }

    /// Push a fragment and drain every line it completes, in arrival order
    pub fn append(&mut self, fragment: impl AsRef<[u8]>) -> Vec<String> {
        self.carry.extend(fragment.as_ref());

        let mut lines = Vec::new();
        while let Some(offset) = self.carry.range(self.scanned..).position(|&b| b == b'\n') {
            let newline_pos = self.scanned + offset;
            let mut line_bytes: Vec<u8> = self.carry.drain(..=newline_pos).collect();
            line_bytes.pop();
            lines.push(decode_line(line_bytes));
            self.scanned = 0;
        }
        self.scanned = self.carry.len();
        lines
    }

    /// Take the unterminated tail, e.g. once the transport has closed
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.carry.is_empty() {
            return None;
        }
        self.scanned = 0;
        let bytes: Vec<u8> = self.carry.drain(..).collect();
        Some(decode_line(bytes))
    }

    pub fn clear(&mut self) {
        self.carry.clear();
        self.scanned = 0;
    }

    /// Bytes waiting for a newline
    pub fn len(&self) -> usize {
        self.carry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carry.is_empty()
    }
}

fn decode_line(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => {
            tracing::debug!("Frame is not valid UTF-8, decoding lossily: {}", e);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}
