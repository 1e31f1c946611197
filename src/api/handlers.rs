//! API request handlers

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::api::types::*;
use crate::producer::ndjson_body;
use crate::producer::FragmentProducer;
use crate::producer::REQUIRED_FIELDS_MESSAGE;
use crate::transport::NDJSON_CONTENT_TYPE;
use crate::StorySlidesError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub producer: FragmentProducer,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generator: state.producer.generator_name().to_string(),
    })
}

/// Stream a story as NDJSON (POST /api/generate)
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejecting generate request body: {}", rejection);
            return error_response(StatusCode::BAD_REQUEST, REQUIRED_FIELDS_MESSAGE);
        }
    };
    info!("POST /api/generate animal={:?}", request.animal);

    match state
        .producer
        .open(request.message.as_deref(), request.animal.as_deref())
        .await
    {
        Ok(fragments) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .header(header::CACHE_CONTROL, "no-cache")
            .body(Body::from_stream(ndjson_body(fragments)))
            .unwrap_or_else(|e| {
                error!("Failed to build streaming response: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Something went wrong on the server: {e}"),
                )
            }),
        Err(StorySlidesError::Validation(message)) => {
            error_response(StatusCode::BAD_REQUEST, &message)
        }
        Err(e) => {
            error!("Error opening generation stream: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Something went wrong on the server: {e}"),
            )
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
