//! HTTP API: one streaming generation endpoint plus a health check

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use server::app;
pub use server::serve_api;
