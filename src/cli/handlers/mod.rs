//! CLI command handlers

pub mod info;
pub mod serve;
pub mod tell;

pub use info::*;
pub use serve::*;
pub use tell::*;
