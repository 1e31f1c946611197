//! Minimal server-sent events framing for upstream responses

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Buffers bytes until a blank line closes a frame
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    /// Searching resumes here; a delimiter may straddle the previous chunk's end
    scanned: usize,
}

/// Longest frame delimiter (`\r\n\r\n`) minus one
const DELIMITER_OVERLAP: usize = 3;

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        let mut start = 0;
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf, self.scanned.max(start)) {
            if let Some(frame) = parse_sse_frame(&self.buf[start..idx]) {
                frames.push(frame);
            }
            start = idx + delim_len;
            self.scanned = start;
        }
        self.buf.drain(..start);
        self.scanned = self.buf.len().saturating_sub(DELIMITER_OVERLAP);
        frames
    }

    /// A last frame the server closed without a trailing blank line
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buf);
        self.scanned = 0;
        parse_sse_frame(&rest)
    }
}

fn find_frame_delimiter(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len() && &buf[i..i + 4] == b"\r\n\r\n" {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start());
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_chunk(b"data: {\"candidates\":[{\"content\":").is_empty());
        let frames = decoder.push_chunk(b"{\"parts\":[]}}]}\r\n\r\ndata: {}");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].data.starts_with("{\"candidates\""));
        assert_eq!(decoder.finish().map(|f| f.data), Some("{}".to_string()));
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_chunk(b"data: a\r\n\r").is_empty());
        let frames = decoder.push_chunk(b"\ndata: b\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "a");
        let frames = decoder.push_chunk(b"\n");
        assert_eq!(frames[0].data, "b");
    }

    #[test]
    fn test_large_frame_in_small_chunks() {
        let mut body = b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"inlineData\":{\"mimeType\":\"image/png\",\"data\":\"".to_vec();
        body.extend(std::iter::repeat(b'A').take(4 * 1024 * 1024));
        body.extend_from_slice(b"\"}}]}}]}\r\n\r\n");

        let mut decoder = SseDecoder::default();
        let mut frames = Vec::new();
        for chunk in body.chunks(8 * 1024) {
            frames.extend(decoder.push_chunk(chunk));
            assert!(decoder.scanned + DELIMITER_OVERLAP >= decoder.buf.len());
        }
        assert_eq!(frames.len(), 1);
        assert!(frames[0].data.ends_with("\"}}]}}]}"));
        assert!(decoder.buf.is_empty());
    }

    #[test]
    fn test_comments_and_event_names() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b": keep-alive\n\nevent: message\ndata: a\ndata: b\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("message"));
        assert_eq!(frames[0].data, "a\nb");
    }
}
