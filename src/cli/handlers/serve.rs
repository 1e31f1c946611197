//! API server handlers

use std::sync::Arc;

use crate::api::serve_api;
use crate::api::AppState;
use crate::cli::output::*;
use crate::llm::ContentGenerator;
use crate::llm::GeminiClient;
use crate::llm::ScriptedGenerator;
use crate::producer::FragmentProducer;
use crate::AppConfig;
use crate::Result;

/// Start the server. CLI arguments take priority over config.
pub async fn handle_serve_api(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
    demo: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors || config.server.cors;

    println!("🚀 Starting storyslides API Server");
    println!("===================================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });

    let generator: Arc<dyn ContentGenerator> = if demo {
        print_warning("Demo mode: serving a canned story, no upstream calls");
        Arc::new(ScriptedGenerator::demo())
    } else {
        // Refuses to start without an API key
        let client = GeminiClient::new(config)?;
        println!("🤖 Model: {}", config.model());
        Arc::new(client)
    };
    println!();

    let state = AppState {
        producer: FragmentProducer::new(generator),
    };
    serve_api(state, &host, port, cors).await
}
