use clap::Parser;
use storyslides::cli::*;
use storyslides::config::AppConfig;
use storyslides::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Initialize logging; the guard must outlive every log call
    let _log_guard = if cli.verbose {
        storyslides::logging::init_logging_with_level("debug")?
    } else {
        storyslides::logging::init_logging_with_config(&config)?
    };
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve {
            host,
            port,
            cors,
            demo,
        } => {
            handle_serve_api(&config, host, port, cors, demo).await?;
        }
        Commands::Tell {
            message,
            animal,
            server,
            html,
            save_images,
        } => {
            handle_tell_command(&config, message, animal, server, html, save_images).await?;
        }
        Commands::Animals => {
            handle_animals_command()?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
    }

    Ok(())
}
