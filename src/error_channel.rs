//! Accumulated error text shown next to a slideshow
//!
//! Setup and transport failures replace whatever was shown; in-stream
//! failures are appended one per line, since a single stream can hit several.

use serde::Deserialize;

use crate::render::HtmlPipeline;

/// Prefix for failures that ended a request before any content arrived
pub const TOP_LEVEL_PREFIX: &str = "Something went wrong";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorLog {
    text: Option<String>,
}

impl ErrorLog {
    /// Adds an in-stream message below any existing ones
    pub fn append(&mut self, message: &str) {
        match &mut self.text {
            Some(text) => {
                text.push('\n');
                text.push_str(message);
            }
            None => self.text = Some(message.to_string()),
        }
    }

    /// Replaces everything with a single request-level failure
    pub fn set_top_level(&mut self, raw: &str) {
        self.text = Some(format!("{TOP_LEVEL_PREFIX}: {}", extract_error_message(raw)));
    }

    pub fn clear(&mut self) {
        self.text = None;
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }

    /// Sanitized HTML, through the same path as slide captions
    pub fn render_html(&self, html: &HtmlPipeline) -> Option<String> {
        self.text.as_deref().map(|text| html.sanitize(text))
    }
}

#[derive(Deserialize)]
struct FlatError {
    error: String,
}

#[derive(Deserialize)]
struct NestedError {
    error: NestedErrorBody,
}

#[derive(Deserialize)]
struct NestedErrorBody {
    message: String,
}

/// Pulls a human-readable message out of error text.
///
/// First the whole text is decoded as `{"error": "<message>"}`. Failing that,
/// the first JSON object embedded in the text that decodes as
/// `{"error": {"message": "<message>"}}` supplies the message. Otherwise the
/// raw text is returned unchanged.
pub fn extract_error_message(raw: &str) -> String {
    if let Ok(flat) = serde_json::from_str::<FlatError>(raw.trim()) {
        return flat.error;
    }

    for (idx, _) in raw.match_indices('{') {
        let mut objects = serde_json::Deserializer::from_str(&raw[idx..]).into_iter::<NestedError>();
        if let Some(Ok(nested)) = objects.next() {
            return nested.error.message;
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_accumulates_lines() {
        let mut log = ErrorLog::default();
        assert!(log.is_empty());
        log.append("Error processing part: one");
        log.append("Error processing part: two");
        assert_eq!(
            log.text(),
            Some("Error processing part: one\nError processing part: two")
        );
    }

    #[test]
    fn test_top_level_replaces() {
        let mut log = ErrorLog::default();
        log.append("earlier");
        log.set_top_level(r#"{"error":"Message and animal are required"}"#);
        assert_eq!(
            log.text(),
            Some("Something went wrong: Message and animal are required")
        );
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_extract_flat_error() {
        assert_eq!(extract_error_message(r#"{"error":"bad key"}"#), "bad key");
    }

    #[test]
    fn test_extract_nested_error_inside_text() {
        let raw = r#"Something went wrong on the server: {"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(extract_error_message(raw), "API key not valid");
    }

    #[test]
    fn test_extract_falls_back_to_raw() {
        assert_eq!(extract_error_message("HTTP error! status: 502"), "HTTP error! status: 502");
        assert_eq!(extract_error_message(r#"{"error": 42}"#), r#"{"error": 42}"#);
    }

    #[test]
    fn test_render_html_is_sanitized() {
        let mut log = ErrorLog::default();
        log.append("<img src=x onerror=alert(1)>oops");
        let html = log.render_html(&HtmlPipeline::default()).unwrap();
        assert!(!html.contains("onerror"));
        assert!(html.contains("oops"));
    }
}
