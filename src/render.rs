//! Markdown rendering and HTML sanitization for fragment-derived text
//!
//! All text that came off the wire goes through [`HtmlPipeline`] before it is
//! displayed: slide captions via [`HtmlPipeline::render_markdown`], error text
//! via [`HtmlPipeline::sanitize`].

use std::sync::Arc;

/// Converts markdown to (unsanitized) HTML
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// Strips anything unsafe to inject into a page
pub trait HtmlSanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> String;
}

/// CommonMark renderer backed by pulldown-cmark
pub struct PulldownMarkdownRenderer;

impl MarkdownRenderer for PulldownMarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        use pulldown_cmark::html;
        use pulldown_cmark::Options;
        use pulldown_cmark::Parser;

        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let mut out = String::new();
        html::push_html(&mut out, Parser::new_ext(markdown, options));
        out
    }
}

/// Allow-list sanitizer backed by ammonia's default policy
pub struct AmmoniaSanitizer;

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        ammonia::clean(html)
    }
}

/// Renderer and sanitizer composed into the one path display text takes
#[derive(Clone)]
pub struct HtmlPipeline {
    renderer: Arc<dyn MarkdownRenderer>,
    sanitizer: Arc<dyn HtmlSanitizer>,
}

impl HtmlPipeline {
    pub fn new(renderer: Arc<dyn MarkdownRenderer>, sanitizer: Arc<dyn HtmlSanitizer>) -> Self {
        Self {
            renderer,
            sanitizer,
        }
    }

    /// `sanitize(render(markdown))`
    pub fn render_markdown(&self, markdown: &str) -> String {
        self.sanitizer.sanitize(&self.renderer.render(markdown))
    }

    pub fn sanitize(&self, html: &str) -> String {
        self.sanitizer.sanitize(html)
    }
}

impl Default for HtmlPipeline {
    fn default() -> Self {
        Self::new(Arc::new(PulldownMarkdownRenderer), Arc::new(AmmoniaSanitizer))
    }
}
