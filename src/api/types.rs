//! API request and response types

use serde::Deserialize;
use serde::Serialize;

/// Body of `POST /api/generate`.
///
/// Both fields are optional at the decoding layer so that a missing field is
/// reported with the same message as a blank one.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub animal: Option<String>,
}

impl GenerateRequest {
    pub fn new(message: impl Into<String>, animal: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            animal: Some(animal.into()),
        }
    }
}

/// Error body for failures that happen before streaming starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub generator: String,
}
