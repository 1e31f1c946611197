//! storyslides: explain anything as an illustrated story.
//!
//! A server streams a generative model's interleaved text and image
//! fragments to the client as NDJSON; the client pairs them into slides as
//! they arrive.

pub mod api;
pub mod assembler;
pub mod cli;
pub mod client;
pub mod config;
pub mod error_channel;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod producer;
pub mod render;
pub mod session;
pub mod transport;

pub use config::AppConfig;
pub use errors::*;
