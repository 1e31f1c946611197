//! Information display handlers (animals, config)

use crate::cli::output::*;
use crate::session::StorySession;
use crate::session::EXAMPLE_PROMPTS;
use crate::AppConfig;
use crate::Result;

pub fn handle_animals_command() -> Result<()> {
    let session = StorySession::new();
    print_info("Built-in metaphor subjects:");
    for animal in session.animals() {
        let marker = if animal == session.selected_animal() {
            " (default)"
        } else {
            ""
        };
        println!("  - {animal}{marker}");
    }
    println!();
    print_info("Try asking:");
    for prompt in EXAMPLE_PROMPTS {
        println!("  - {prompt}");
    }
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    Ok(())
}
