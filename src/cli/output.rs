//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `storyslides` CLI

use std::fmt::Write as _;
use std::path::Path;
use std::path::PathBuf;

use crate::error_channel::ErrorLog;
use crate::models::InlineData;
use crate::models::Slide;
use crate::render::HtmlPipeline;
use crate::AppConfig;
use crate::Result;
use crate::StorySlidesError;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Caption HTML reduced to plain text for the terminal
#[must_use]
pub fn html_to_plain(html: &str) -> String {
    let stripped = ammonia::Builder::empty().clean(html).to_string();
    stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print one slide as it arrives
pub fn print_slide(index: usize, slide: &Slide) {
    let caption = html_to_plain(&slide.text);
    let caption = if caption.is_empty() {
        "(no caption)".to_string()
    } else {
        caption
    };
    match &slide.image_url {
        Some(url) => println!(
            "🖼️  [{index}] {caption}  ({})",
            truncate_str(url, 32)
        ),
        None => println!("📝 [{index}] {caption}"),
    }
}

pub fn print_error_log(errors: &ErrorLog) {
    if let Some(text) = errors.text() {
        for line in text.lines() {
            print_error(line);
        }
    }
}

/// Parse a `data:<mime>;base64,<data>` URI back into its parts
pub fn parse_data_uri(uri: &str) -> Option<InlineData> {
    let rest = uri.strip_prefix("data:")?;
    let (mime_type, data) = rest.split_once(";base64,")?;
    Some(InlineData {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// Write every slide illustration to `dir`, returning the written paths
pub fn save_slide_images(slides: &[Slide], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (index, slide) in slides.iter().enumerate() {
        let Some(url) = &slide.image_url else {
            continue;
        };
        let inline = parse_data_uri(url).ok_or_else(|| {
            StorySlidesError::Render(format!("slide {} has no inline image data", index + 1))
        })?;
        let path = dir.join(format!(
            "slide-{:02}.{}",
            index + 1,
            extension_for(&inline.mime_type)
        ));
        std::fs::write(&path, inline.decode_bytes()?)?;
        written.push(path);
    }
    Ok(written)
}

/// Standalone HTML page for a finished slideshow.
///
/// Slide text is already sanitized; the title and error text go through the
/// same pipeline before they are embedded.
pub fn render_slideshow_page(
    title: &str,
    slides: &[Slide],
    errors: &ErrorLog,
    html: &HtmlPipeline,
) -> String {
    let title = ammonia::clean_text(title);
    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}\n\
         .slides {{ display: flex; gap: 1rem; overflow-x: auto; scroll-snap-type: x mandatory; }}\n\
         .slide {{ flex: 0 0 24rem; scroll-snap-align: start; }}\n\
         .slide img {{ width: 100%; }}\n\
         .errors {{ color: #b00020; white-space: pre-line; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n<div class=\"slides\">\n"
    );
    for slide in slides {
        let _ = writeln!(page, "<section class=\"slide\" id=\"{}\">", slide.id);
        if let Some(url) = &slide.image_url {
            let _ = writeln!(page, "<img src=\"{}\" alt=\"\">", ammonia::clean_text(url));
        }
        let _ = writeln!(page, "<div class=\"caption\">{}</div>\n</section>", slide.text);
    }
    page.push_str("</div>\n");
    if let Some(error_html) = errors.render_html(html) {
        let _ = writeln!(page, "<div class=\"errors\">{error_html}</div>");
    }
    page.push_str("</body>\n</html>\n");
    page
}

pub fn print_config(config: &AppConfig) {
    println!("📋 storyslides Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Listen: {}", config.bind_addr());
    println!("  CORS: {}", if config.server.cors { "Enabled" } else { "Disabled" });
    println!();

    println!("🤖 Generation:");
    println!("  Endpoint: {}", config.generation.endpoint);
    println!("  Model: {}", config.model());
    println!("  API key: {}", mask_secret(&config.generation.api_key));
    println!("  Request timeout: {}s", config.generation.request_timeout_secs);
    println!("  Connect timeout: {}s", config.generation.connect_timeout_secs);
    println!();

    println!("💻 Client:");
    println!("  Server URL: {}", config.client.server_url);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.log_level());
}

/// Keep only the last four characters of a secret
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}
