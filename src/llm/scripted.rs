//! Canned generator for demos and tests

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt as _;

use super::ContentGenerator;
use super::GenerationRequest;
use super::StreamingResponse;
use crate::models::Fragment;
use crate::Result;
use crate::StorySlidesError;

/// 1x1 transparent PNG
const DEMO_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Replays a fixed fragment script for every call.
///
/// An `Err(msg)` entry becomes a mid-stream failure and ends the stream.
pub struct ScriptedGenerator {
    script: Vec<std::result::Result<Fragment, String>>,
    setup_error: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<std::result::Result<Fragment, String>>) -> Self {
        Self {
            script,
            setup_error: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails before any fragment is produced
    pub fn failing_setup(message: impl Into<String>) -> Self {
        Self {
            setup_error: Some(message.into()),
            ..Self::new(Vec::new())
        }
    }

    /// Pause before each fragment
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `open_stream` has been called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A short story about whatever animal was asked for
    pub fn demo() -> Self {
        let lines = [
            "Imagine a **tiny** crowd gathered on a windowsill.",
            "Each one carries a crumb of sunlight back to the group.",
            "Together they turn those crumbs into a feast.",
        ];
        let script = lines
            .iter()
            .flat_map(|line| {
                [
                    Ok(Fragment::text(*line)),
                    Ok(Fragment::image("image/png", DEMO_PNG_BASE64)),
                ]
            })
            .collect();
        Self::new(script).with_delay(Duration::from_millis(150))
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn open_stream(&self, request: &GenerationRequest) -> Result<StreamingResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(animal = %request.animal, "replaying scripted story");
        if let Some(message) = &self.setup_error {
            return Err(StorySlidesError::Setup(message.clone()));
        }

        // Items after the first failure are never yielded.
        let mut items = Vec::with_capacity(self.script.len());
        for entry in &self.script {
            match entry {
                Ok(fragment) => items.push(Ok(fragment.clone())),
                Err(message) => {
                    items.push(Err(StorySlidesError::Stream(message.clone())));
                    break;
                }
            }
        }

        let delay = self.delay;
        let stream = stream::iter(items).then(move |item| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            item
        });
        Ok(StreamingResponse::new(Box::pin(stream)))
    }
}
