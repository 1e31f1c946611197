//! Server side of a generation: validate, open one upstream stream, and
//! serialize its fragments as NDJSON.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use futures::Stream;
use futures::StreamExt as _;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::llm::ContentGenerator;
use crate::llm::FragmentStream;
use crate::llm::GenerationRequest;
use crate::models::Fragment;
use crate::Result;
use crate::StorySlidesError;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Message and animal are required";

/// Trims both fields, rejecting the request when either ends up empty
pub fn validate_request(message: Option<&str>, animal: Option<&str>) -> Result<GenerationRequest> {
    let message = message.map(str::trim).unwrap_or_default();
    let animal = animal.map(str::trim).unwrap_or_default();
    if message.is_empty() || animal.is_empty() {
        return Err(StorySlidesError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }
    Ok(GenerationRequest::new(message, animal))
}

#[derive(Clone)]
pub struct FragmentProducer {
    generator: Arc<dyn ContentGenerator>,
}

impl FragmentProducer {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Validates and opens exactly one upstream stream.
    ///
    /// Validation failures return before the generator is touched.
    pub async fn open(&self, message: Option<&str>, animal: Option<&str>) -> Result<FragmentStream> {
        let request = validate_request(message, animal)?;
        info!(
            generator = self.generator.name(),
            animal = %request.animal,
            message_len = request.message.len(),
            "opening fragment stream"
        );
        let response = self.generator.open_stream(&request).await?;
        Ok(response.into_stream())
    }
}

/// Serializes fragments one line at a time.
///
/// An upstream failure becomes a final `{"error":"Streaming error: ..."}`
/// line and the body then ends normally.
pub fn ndjson_body(
    fragments: FragmentStream,
) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> + Send {
    struct State {
        fragments: FragmentStream,
        written: usize,
        done: bool,
    }

    stream::unfold(
        State {
            fragments,
            written: 0,
            done: false,
        },
        |mut state| async move {
            if state.done {
                return None;
            }
            let fragment = match state.fragments.next().await {
                Some(Ok(fragment)) => fragment,
                Some(Err(e)) => {
                    warn!(written = state.written, "upstream stream failed: {}", e);
                    state.done = true;
                    Fragment::error(format!("Streaming error: {e}"))
                }
                None => {
                    debug!(written = state.written, "fragment stream complete");
                    return None;
                }
            };

            let line = match fragment.to_line() {
                Ok(line) => line,
                Err(e) => {
                    warn!("failed to serialize fragment: {}", e);
                    state.done = true;
                    error_line(&format!("Streaming error: {e}"))
                }
            };
            state.written += 1;
            Some((Ok::<_, Infallible>(Bytes::from(line)), state))
        },
    )
}

fn error_line(message: &str) -> String {
    let mut line = serde_json::json!({ "error": message }).to_string();
    line.push('\n');
    line
}
