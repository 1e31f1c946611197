//! Gemini `streamGenerateContent` client with mixed text/image output

use std::collections::VecDeque;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::Stream;
use futures::StreamExt as _;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tracing::info;
use url::Url;

use super::sse::SseDecoder;
use super::sse::SseFrame;
use super::ContentGenerator;
use super::GenerationRequest;
use super::StreamingResponse;
use crate::config::AppConfig;
use crate::models::Fragment;
use crate::models::InlineData;
use crate::Result;
use crate::StorySlidesError;

type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send>>;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let endpoint = Url::parse(&config.generation.endpoint).map_err(|e| {
            StorySlidesError::Config(format!(
                "invalid generation endpoint {:?}: {e}",
                config.generation.endpoint
            ))
        })?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint,
            model: config.model().to_string(),
            api_key,
        })
    }

    fn stream_url(&self) -> Result<Url> {
        let path = format!("v1beta/models/{}:streamGenerateContent", self.model);
        let mut url = self
            .endpoint
            .join(&path)
            .map_err(|e| StorySlidesError::Config(format!("invalid model path {path:?}: {e}")))?;
        url.query_pairs_mut().append_pair("alt", "sse");
        Ok(url)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn open_stream(&self, request: &GenerationRequest) -> Result<StreamingResponse> {
        let url = self.stream_url()?;
        info!(model = %self.model, animal = %request.animal, "opening Gemini content stream");

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&build_request_body(&request.prompt))
            .send()
            .await
            .map_err(|e| StorySlidesError::Setup(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorySlidesError::Setup(setup_error_message(status.as_u16(), &body)));
        }

        let bytes: ByteStream = Box::pin(response.bytes_stream());
        Ok(StreamingResponse::new(Box::pin(gemini_fragment_stream(bytes))))
    }
}

pub(crate) fn build_request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }],
        }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"],
        },
    })
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

/// Prefers the API's own `error.message` over the raw body
fn setup_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => format!("Gemini request failed with status {status}: {body}"),
    }
}

/// Parts that are neither text nor inline data are skipped
pub(crate) fn map_frame_to_fragments(frame: &SseFrame) -> Result<Vec<Fragment>> {
    let data = frame.data.trim();
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| StorySlidesError::Stream(format!("invalid Gemini stream frame: {e}")))?;
    if let Some(error) = chunk.error {
        return Err(StorySlidesError::Stream(error.message));
    }

    let fragments = chunk
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| match (part.text, part.inline_data) {
            (Some(text), _) => Some(Fragment::Text { text }),
            (None, Some(inline_data)) => Some(Fragment::Image { inline_data }),
            (None, None) => None,
        })
        .collect();
    Ok(fragments)
}

fn gemini_fragment_stream(bytes: ByteStream) -> impl Stream<Item = Result<Fragment>> + Send {
    struct State {
        bytes: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<Fragment>,
        done: bool,
        frames: usize,
    }

    stream::try_unfold(
        State {
            bytes,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            done: false,
            frames: 0,
        },
        |mut state| async move {
            loop {
                if let Some(fragment) = state.pending.pop_front() {
                    return Ok(Some((fragment, state)));
                }
                if state.done {
                    debug!(frames = state.frames, "Gemini stream ended");
                    return Ok(None);
                }

                match state.bytes.next().await {
                    Some(Ok(chunk)) => {
                        for frame in state.decoder.push_chunk(&chunk) {
                            state.frames += 1;
                            state.pending.extend(map_frame_to_fragments(&frame)?);
                        }
                    }
                    Some(Err(e)) => {
                        return Err(StorySlidesError::Stream(format!(
                            "Gemini streaming read failed: {e}"
                        )));
                    }
                    None => {
                        if let Some(frame) = state.decoder.finish() {
                            state.frames += 1;
                            state.pending.extend(map_frame_to_fragments(&frame)?);
                        }
                        state.done = true;
                    }
                }
            }
        },
    )
}
