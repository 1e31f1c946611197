//! Story client handler: stream slides from a running server

use std::path::PathBuf;

use futures::StreamExt as _;
use tracing::info;

use crate::assembler::AssemblerEvent;
use crate::cli::output::*;
use crate::client::StoryClient;
use crate::render::HtmlPipeline;
use crate::session::StorySession;
use crate::AppConfig;
use crate::Result;

pub async fn handle_tell_command(
    config: &AppConfig,
    message: String,
    animal: Option<String>,
    server: Option<String>,
    html_out: Option<PathBuf>,
    save_images: Option<PathBuf>,
) -> Result<()> {
    let server_url = server.unwrap_or_else(|| config.client.server_url.clone());
    let client = StoryClient::new(&server_url)?;
    let html = HtmlPipeline::default();

    let mut session = StorySession::new();
    if let Some(animal) = animal.as_deref() {
        session.add_custom_animal(animal);
    }
    let animal = session.selected_animal().to_string();

    print_info(&format!("Explaining \"{message}\" with {animal}..."));
    println!();

    let generation = session.begin_generation();
    match client
        .generate(generation, &message, &animal, html.clone())
        .await
    {
        Ok(mut events) => {
            while let Some(event) = events.next().await {
                if let AssemblerEvent::Error { message, .. } = &event {
                    print_error(message);
                }
                let slide = match &event {
                    AssemblerEvent::Slide(slide) => Some(slide.clone()),
                    AssemblerEvent::Error { .. } => None,
                };
                if session.slideshow_mut().apply(event) {
                    if let Some(slide) = slide {
                        print_slide(session.slideshow().slides().len(), &slide);
                    }
                }
            }
            session.slideshow_mut().complete(generation);
        }
        Err(e) => {
            session.slideshow_mut().fail(generation, &e.to_string());
            print_error_log(session.slideshow().errors());
            return Err(e);
        }
    }

    let slideshow = session.slideshow();
    println!();
    info!(
        slides = slideshow.slides().len(),
        errors = !slideshow.errors().is_empty(),
        "story finished"
    );
    if slideshow.slides().is_empty() {
        print_warning("No slides were produced");
    } else {
        print_success(&format!("{} slides", slideshow.slides().len()));
    }

    if let Some(path) = html_out {
        let page = render_slideshow_page(&message, slideshow.slides(), slideshow.errors(), &html);
        std::fs::write(&path, page)?;
        print_success(&format!("Slideshow written to: {}", path.display()));
    }

    if let Some(dir) = save_images {
        let written = save_slide_images(slideshow.slides(), &dir)?;
        print_success(&format!(
            "{} images saved to: {}",
            written.len(),
            dir.display()
        ));
    }

    Ok(())
}
