//! Newline-delimited JSON framing shared by the producer and the assembler
//!
//! Every record is one JSON document followed by `\n`. Network chunks carry
//! no framing of their own: a record, or a single UTF-8 code point inside it,
//! may be split across any number of reads.

use crate::models::Fragment;
use crate::Result;
use crate::StorySlidesError;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Splits an arbitrarily chunked byte stream into complete lines
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
    /// Bytes of `buf` already searched for a newline
    scanned: usize,
}

impl LineDecoder {
    /// Buffers `chunk` and returns every line it completed, trimmed, blanks dropped
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            let end = self.scanned + offset;
            if let Some(line) = decode_line(&self.buf[start..end]) {
                lines.push(line);
            }
            start = end + 1;
            self.scanned = start;
        }
        self.buf.drain(..start);
        self.scanned = self.buf.len();
        lines
    }

    /// Takes the trailing line that never got its newline
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        self.scanned = 0;
        decode_line(&rest)
    }

    /// Bytes held back waiting for a newline
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

fn decode_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses one line into a record.
///
/// Syntax errors and JSON that matches no record shape are both `Parse`
/// errors, distinguished only by their message.
pub fn parse_record(line: &str) -> Result<Fragment> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| StorySlidesError::Parse(format!("invalid JSON: {e}")))?;
    serde_json::from_value(value).map_err(|_| {
        StorySlidesError::Parse(format!(
            "record has no text, inlineData or error field: {}",
            preview(line, 80)
        ))
    })
}

fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}
