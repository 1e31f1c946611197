//! Slide assembly: NDJSON bytes in, paired (text, image) slides out
//!
//! [`SlideAssembler`] is a synchronous state machine fed with raw chunks;
//! [`assemble`] drives it from an async byte stream. Slides are emitted
//! as soon as the accumulator holds non-blank text and an image. Whatever is
//! left when the stream ends is flushed as one last, possibly unpaired slide.
//!
//! Only one image is kept per accumulation window: a second image arriving
//! before the pending one was paired replaces it, and the first is dropped.
//! Image records with empty data are skipped.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use futures::stream;
use futures::Stream;
use futures::StreamExt as _;
use tracing::debug;
use tracing::warn;

use crate::models::Fragment;
use crate::models::GenerationId;
use crate::models::Slide;
use crate::render::HtmlPipeline;
use crate::transport::parse_record;
use crate::transport::LineDecoder;

/// Output of the assembler, tagged with the generation that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerEvent {
    Slide(Slide),
    /// In-stream problem: an error record, an unparseable line, or a failed read
    Error {
        generation: GenerationId,
        message: String,
    },
}

impl AssemblerEvent {
    pub fn generation(&self) -> GenerationId {
        match self {
            Self::Slide(slide) => slide.generation,
            Self::Error { generation, .. } => *generation,
        }
    }
}

pub type SlideStream = Pin<Box<dyn Stream<Item = AssemblerEvent> + Send>>;

/// Text and image received since the last flush
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Accumulator {
    pending_text: String,
    pending_image: Option<String>,
}

impl Accumulator {
    pub fn push_text(&mut self, text: &str) {
        self.pending_text.push_str(text);
    }

    /// Last one wins
    pub fn set_image(&mut self, data_uri: String) {
        self.pending_image = Some(data_uri);
    }

    pub fn is_paired(&self) -> bool {
        !self.pending_text.trim().is_empty() && self.pending_image.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_text.is_empty() && self.pending_image.is_none()
    }

    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    pub fn pending_image(&self) -> Option<&str> {
        self.pending_image.as_deref()
    }

    /// Empties the accumulator, returning what it held
    pub fn take(&mut self) -> (String, Option<String>) {
        let text = std::mem::take(&mut self.pending_text);
        (text, self.pending_image.take())
    }
}

#[derive(Debug, Clone, Copy)]
enum LineOrigin {
    Streaming,
    FinalBuffer,
}

impl LineOrigin {
    fn error_prefix(self) -> &'static str {
        match self {
            Self::Streaming => "Error processing part",
            Self::FinalBuffer => "Error parsing final data",
        }
    }
}

/// Incremental NDJSON-to-slide reducer for one generation request
pub struct SlideAssembler {
    generation: GenerationId,
    decoder: LineDecoder,
    accumulator: Accumulator,
    html: HtmlPipeline,
    finished: bool,
    slides_emitted: usize,
}

impl SlideAssembler {
    pub fn new(generation: GenerationId, html: HtmlPipeline) -> Self {
        Self {
            generation,
            decoder: LineDecoder::default(),
            accumulator: Accumulator::default(),
            html,
            finished: false,
            slides_emitted: 0,
        }
    }

    pub fn generation(&self) -> GenerationId {
        self.generation
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn slides_emitted(&self) -> usize {
        self.slides_emitted
    }

    /// Feeds one network chunk; returns the events it completed, in order
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<AssemblerEvent> {
        let mut events = Vec::new();
        if self.finished {
            warn!(generation = %self.generation, "chunk received after end of stream, ignoring");
            return events;
        }
        for line in self.decoder.push_chunk(chunk) {
            self.apply_line(&line, LineOrigin::Streaming, &mut events);
        }
        events
    }

    /// Signals end of data: drains the unterminated tail, then flushes any
    /// partial accumulation. Idempotent.
    pub fn finish(&mut self) -> Vec<AssemblerEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        self.finished = true;

        if let Some(line) = self.decoder.finish() {
            self.apply_line(&line, LineOrigin::FinalBuffer, &mut events);
        }

        let (text, image) = self.accumulator.take();
        let text = text.trim();
        match (text.is_empty(), image) {
            (true, None) => {}
            // Keeps an image-only slide from rendering with a blank caption
            (true, Some(image)) => events.push(self.emit(" ".to_string(), Some(image))),
            (false, image) => {
                let rendered = self.html.render_markdown(text);
                events.push(self.emit(rendered, image));
            }
        }

        debug!(
            generation = %self.generation,
            slides = self.slides_emitted,
            "slide stream finished"
        );
        events
    }

    fn apply_line(&mut self, line: &str, origin: LineOrigin, events: &mut Vec<AssemblerEvent>) {
        let fragment = match parse_record(line) {
            Ok(fragment) => fragment,
            Err(e) => {
                warn!(generation = %self.generation, "skipping unparseable line: {}", e);
                events.push(self.error(format!("{}: {e}", origin.error_prefix())));
                return;
            }
        };

        match fragment {
            Fragment::Error { error } => {
                events.push(self.error(format!("{}: {error}", origin.error_prefix())));
            }
            Fragment::Text { text } => self.accumulator.push_text(&text),
            Fragment::Image { inline_data } if inline_data.data.is_empty() => {
                debug!(generation = %self.generation, "ignoring image record without data");
            }
            Fragment::Image { inline_data } => {
                if self.accumulator.pending_image().is_some() {
                    debug!(generation = %self.generation, "replacing unpaired pending image");
                }
                self.accumulator.set_image(inline_data.data_uri());
            }
        }

        if self.accumulator.is_paired() {
            let (text, image) = self.accumulator.take();
            let rendered = self.html.render_markdown(text.trim());
            events.push(self.emit(rendered, image));
        }
    }

    fn emit(&mut self, text: String, image_url: Option<String>) -> AssemblerEvent {
        self.slides_emitted += 1;
        AssemblerEvent::Slide(Slide::new(self.generation, text, image_url))
    }

    fn error(&self, message: String) -> AssemblerEvent {
        AssemblerEvent::Error {
            generation: self.generation,
            message,
        }
    }
}

/// Drives a [`SlideAssembler`] from a byte stream.
///
/// The returned stream is lazy, finite, and ends after the underlying stream
/// does. A failed read is reported as an error event and then treated as end
/// of data, so content assembled so far is still flushed.
pub fn assemble<S, B, E>(assembler: SlideAssembler, bytes: S) -> SlideStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    struct State<S> {
        assembler: SlideAssembler,
        bytes: Pin<Box<S>>,
        pending: VecDeque<AssemblerEvent>,
        done: bool,
    }

    let state = State {
        assembler,
        bytes: Box::pin(bytes),
        pending: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((event, state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.assembler.push_chunk(chunk.as_ref());
                    state.pending.extend(events);
                }
                Some(Err(e)) => {
                    warn!(generation = %state.assembler.generation(), "stream read failed: {}", e);
                    state.pending.push_back(AssemblerEvent::Error {
                        generation: state.assembler.generation(),
                        message: format!("Stream read failed: {e}"),
                    });
                    state.pending.extend(state.assembler.finish());
                    state.done = true;
                }
                None => {
                    state.pending.extend(state.assembler.finish());
                    state.done = true;
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    fn assembler() -> SlideAssembler {
        SlideAssembler::new(GenerationId(7), HtmlPipeline::default())
    }

    fn lines(fragments: &[Fragment]) -> Vec<u8> {
        fragments
            .iter()
            .flat_map(|f| f.to_line().unwrap().into_bytes())
            .collect()
    }

    fn slides(events: &[AssemblerEvent]) -> Vec<&Slide> {
        events
            .iter()
            .filter_map(|e| match e {
                AssemblerEvent::Slide(s) => Some(s),
                AssemblerEvent::Error { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_pairing_completes_on_image() {
        let mut a = assembler();
        let events = a.push_chunk(&lines(&[Fragment::text("Hello "), Fragment::text("world.")]));
        assert!(events.is_empty());
        assert_eq!(a.accumulator().pending_text(), "Hello world.");

        let events = a.push_chunk(&lines(&[Fragment::image("image/png", "AAA")]));
        let out = slides(&events);
        assert_eq!(out.len(), 1);
        assert!(out[0].text.contains("<p>Hello world.</p>"));
        assert_eq!(out[0].image_url.as_deref(), Some("data:image/png;base64,AAA"));
        assert_eq!(out[0].generation, GenerationId(7));
        assert!(a.accumulator().is_empty());
        assert!(a.finish().is_empty());
    }

    #[test]
    fn test_pairing_completes_on_text_after_image() {
        let mut a = assembler();
        let events = a.push_chunk(&lines(&[
            Fragment::image("image/png", "AAA"),
            Fragment::text("Cats nap."),
        ]));
        assert_eq!(slides(&events).len(), 1);
    }

    #[test]
    fn test_whitespace_text_does_not_pair() {
        let mut a = assembler();
        let events = a.push_chunk(&lines(&[
            Fragment::text("  \n"),
            Fragment::image("image/png", "AAA"),
        ]));
        assert!(events.is_empty());
        let events = a.finish();
        let out = slides(&events);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, " ");
    }

    #[test]
    fn test_image_without_data_is_ignored() {
        let mut a = assembler();
        let events = a.push_chunk(&lines(&[
            Fragment::text("Cats nap."),
            Fragment::image("image/png", ""),
        ]));
        assert!(events.is_empty());
        assert_eq!(a.accumulator().pending_image(), None);

        let events = a.push_chunk(&lines(&[Fragment::image("image/png", "AAA")]));
        let out = slides(&events);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].image_url.as_deref(), Some("data:image/png;base64,AAA"));
    }

    #[test]
    fn test_image_without_data_alone_emits_nothing() {
        let mut a = assembler();
        a.push_chunk(&lines(&[Fragment::image("image/png", "")]));
        assert!(a.finish().is_empty());
    }

    #[test]
    fn test_second_image_replaces_first() {
        let mut a = assembler();
        a.push_chunk(&lines(&[
            Fragment::image("image/png", "FIRST"),
            Fragment::image("image/jpeg", "SECOND"),
        ]));
        assert_eq!(
            a.accumulator().pending_image(),
            Some("data:image/jpeg;base64,SECOND")
        );
        let events = a.push_chunk(&lines(&[Fragment::text("One slide.")]));
        let out = slides(&events);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].image_url.as_deref(), Some("data:image/jpeg;base64,SECOND"));
    }

    #[test]
    fn test_final_line_without_newline_is_processed() {
        let mut a = assembler();
        let mut bytes = lines(&[Fragment::text("Tail text.")]);
        bytes.extend_from_slice(br#"{"inlineData":{"mimeType":"image/png","data":"AAA"}}"#);
        assert!(a.push_chunk(&bytes).is_empty());
        let events = a.finish();
        let out = slides(&events);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].image_url.as_deref(), Some("data:image/png;base64,AAA"));
    }

    #[test]
    fn test_final_buffer_errors_use_final_prefix() {
        let mut a = assembler();
        a.push_chunk(b"{\"text\":\"ok\"}\n{\"text\":");
        let events = a.finish();
        assert!(matches!(
            &events[0],
            AssemblerEvent::Error { message, .. } if message.starts_with("Error parsing final data:")
        ));
        assert_eq!(slides(&events).len(), 1);
    }

    #[test]
    fn test_error_record_does_not_stop_processing() {
        let mut a = assembler();
        let mut events = a.push_chunk(&lines(&[
            Fragment::error("Streaming error: quota"),
            Fragment::text("still works"),
        ]));
        events.extend(a.finish());
        assert_eq!(
            events[0],
            AssemblerEvent::Error {
                generation: GenerationId(7),
                message: "Error processing part: Streaming error: quota".to_string(),
            }
        );
        let out = slides(&events);
        assert_eq!(out.len(), 1);
        assert!(out[0].text.contains("still works"));
        assert_eq!(out[0].image_url, None);
    }

    #[test]
    fn test_whitespace_only_tail_is_dropped() {
        let mut a = assembler();
        a.push_chunk(&lines(&[Fragment::text("   ")]));
        assert!(a.finish().is_empty());
    }

    #[test]
    fn test_chunks_after_finish_are_ignored() {
        let mut a = assembler();
        a.finish();
        assert!(a.push_chunk(&lines(&[Fragment::text("late")])).is_empty());
        assert!(a.finish().is_empty());
    }

    #[test]
    fn test_empty_stream_emits_nothing() {
        let mut a = assembler();
        assert!(a.push_chunk(b"\n\n").is_empty());
        assert!(a.finish().is_empty());
        assert_eq!(a.slides_emitted(), 0);
    }

    #[tokio::test]
    async fn test_assemble_flushes_after_read_error() {
        let chunks: Vec<Result<Vec<u8>, String>> = vec![
            Ok(lines(&[Fragment::text("Partial story.")])),
            Err("connection reset".to_string()),
            Ok(lines(&[Fragment::text("never read")])),
        ];
        let events: Vec<AssemblerEvent> = assemble(assembler(), stream::iter(chunks))
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            AssemblerEvent::Error { message, .. } if message == "Stream read failed: connection reset"
        ));
        let out = slides(&events);
        assert!(out[0].text.contains("Partial story."));
    }
}
