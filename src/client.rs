//! HTTP client for a running storyslides server

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tracing::info;
use url::Url;

use crate::api::types::GenerateRequest;
use crate::assembler::assemble;
use crate::assembler::SlideAssembler;
use crate::assembler::SlideStream;
use crate::models::GenerationId;
use crate::render::HtmlPipeline;
use crate::Result;
use crate::StorySlidesError;

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct StoryClient {
    http: Client,
    base_url: Url,
}

impl StoryClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(server_url).map_err(|e| {
            StorySlidesError::Config(format!("invalid server url {server_url:?}: {e}"))
        })?;
        // Relative joins replace the last path segment unless it ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::builder().build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn generate_url(&self) -> Result<Url> {
        self.base_url
            .join("api/generate")
            .map_err(|e| StorySlidesError::Config(format!("invalid server url: {e}")))
    }

    /// Starts one generation and returns its slide stream.
    ///
    /// Failures before the body starts (network, non-2xx) are `Setup` errors
    /// and produce no events. Everything after that arrives in the stream.
    pub async fn generate(
        &self,
        generation: GenerationId,
        message: &str,
        animal: &str,
        html: HtmlPipeline,
    ) -> Result<SlideStream> {
        if message.trim().is_empty() {
            return Err(StorySlidesError::Validation(
                "Message must not be empty".to_string(),
            ));
        }
        let url = self.generate_url()?;

        info!(%generation, %url, "requesting story");
        let response = self
            .http
            .post(url)
            .json(&GenerateRequest::new(message, animal))
            .send()
            .await
            .map_err(|e| StorySlidesError::Setup(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(ErrorBody { error: Some(error) }) => error,
                Ok(ErrorBody { error: None }) => format!("HTTP error! status: {}", status.as_u16()),
                Err(e) => {
                    debug!("unreadable error body: {}", e);
                    "Failed to parse error response".to_string()
                }
            };
            return Err(StorySlidesError::Setup(message));
        }

        let assembler = SlideAssembler::new(generation, html);
        Ok(assemble(assembler, response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_server_url() {
        assert!(matches!(
            StoryClient::new("not a url").err(),
            Some(StorySlidesError::Config(_))
        ));
    }

    #[test]
    fn test_path_prefix_is_kept() {
        for server_url in ["http://127.0.0.1:9/story", "http://127.0.0.1:9/story/"] {
            let client = StoryClient::new(server_url).unwrap();
            assert_eq!(
                client.generate_url().unwrap().as_str(),
                "http://127.0.0.1:9/story/api/generate"
            );
        }
        let client = StoryClient::new("http://127.0.0.1:9").unwrap();
        assert_eq!(
            client.generate_url().unwrap().as_str(),
            "http://127.0.0.1:9/api/generate"
        );
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_locally() {
        let client = StoryClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .generate(GenerationId(1), "  ", "Tiny Cats", HtmlPipeline::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StorySlidesError::Validation(_)));
    }
}
