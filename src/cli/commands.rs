//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "storyslides")]
#[command(about = "Explain anything as an illustrated story, one slide per sentence")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: level from config)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the streaming API server
    Serve {
        /// Host address (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port number (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS for all origins
        #[arg(long)]
        cors: bool,
        /// Serve a canned story instead of calling the upstream model
        #[arg(long)]
        demo: bool,
    },
    /// Ask a running server for a story and print its slides as they arrive
    Tell {
        /// What to explain
        message: String,
        /// Metaphor subject (default: the first built-in animal)
        #[arg(short, long)]
        animal: Option<String>,
        /// Server base URL (default: from config)
        #[arg(short, long)]
        server: Option<String>,
        /// Also write the finished slideshow as a standalone HTML page
        #[arg(long)]
        html: Option<PathBuf>,
        /// Save each slide's illustration into this directory
        #[arg(long)]
        save_images: Option<PathBuf>,
    },
    /// List the built-in metaphor subjects and example prompts
    Animals,
    /// Show current configuration
    Config,
}
