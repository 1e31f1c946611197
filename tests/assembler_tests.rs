use futures::stream;
use futures::StreamExt;
use storyslides::assembler::assemble;
use storyslides::assembler::AssemblerEvent;
use storyslides::assembler::SlideAssembler;
use storyslides::models::Fragment;
use storyslides::models::GenerationId;
use storyslides::render::HtmlPipeline;

/// Slide contents and error messages, with random slide ids dropped
#[derive(Debug, PartialEq, Eq)]
enum Seen {
    Slide(String, Option<String>),
    Error(String),
}

fn body(fragments: &[Fragment]) -> Vec<u8> {
    fragments
        .iter()
        .flat_map(|f| f.to_line().unwrap().into_bytes())
        .collect()
}

fn seen(events: Vec<AssemblerEvent>) -> Vec<Seen> {
    events
        .into_iter()
        .map(|event| match event {
            AssemblerEvent::Slide(slide) => Seen::Slide(slide.text, slide.image_url),
            AssemblerEvent::Error { message, .. } => Seen::Error(message),
        })
        .collect()
}

fn run_in_chunks(bytes: &[u8], chunk_size: usize) -> Vec<Seen> {
    let mut assembler = SlideAssembler::new(GenerationId(1), HtmlPipeline::default());
    let mut events = Vec::new();
    for chunk in bytes.chunks(chunk_size) {
        events.extend(assembler.push_chunk(chunk));
    }
    events.extend(assembler.finish());
    seen(events)
}

fn story() -> Vec<u8> {
    let mut bytes = body(&[
        Fragment::text("Imagine a café full of **tiny** cats 🐱. "),
        Fragment::text("Each one naps in the sun."),
        Fragment::image("image/png", "AAAA"),
        Fragment::error("Streaming error: hiccup"),
        Fragment::image("image/png", "BBBB"),
        Fragment::text("Then they wake up."),
        Fragment::text("The end."),
    ]);
    bytes.extend_from_slice(b"not json\n\n   \n");
    bytes.extend_from_slice(br#"{"inlineData":{"mimeType":"image/jpeg","data":"CCCC"}}"#);
    bytes
}

#[test]
fn test_output_is_independent_of_chunking() {
    let bytes = story();
    let whole = run_in_chunks(&bytes, bytes.len());
    for chunk_size in [1, 2, 3, 5, 7, 64] {
        assert_eq!(
            run_in_chunks(&bytes, chunk_size),
            whole,
            "chunk size {chunk_size}"
        );
    }
}

#[test]
fn test_story_slides_in_arrival_order() {
    let out = run_in_chunks(&story(), 4);
    assert_eq!(out.len(), 5);

    let Seen::Slide(text, image) = &out[0] else {
        panic!("expected first slide, got {:?}", out[0]);
    };
    assert!(text.contains("café"));
    assert!(text.contains("<strong>tiny</strong>"));
    assert!(text.contains("🐱"));
    assert!(text.contains("Each one naps"));
    assert_eq!(image.as_deref(), Some("data:image/png;base64,AAAA"));

    assert_eq!(
        out[1],
        Seen::Error("Error processing part: Streaming error: hiccup".to_string())
    );

    let Seen::Slide(text, image) = &out[2] else {
        panic!("expected second slide, got {:?}", out[2]);
    };
    assert!(text.contains("Then they wake up."));
    assert!(!text.contains("The end."));
    assert_eq!(image.as_deref(), Some("data:image/png;base64,BBBB"));

    assert!(matches!(&out[3], Seen::Error(m) if m.starts_with("Error processing part: ")));

    // "The end." pairs with the unterminated final image
    let Seen::Slide(text, image) = &out[4] else {
        panic!("expected final slide, got {:?}", out[4]);
    };
    assert!(text.contains("The end."));
    assert_eq!(image.as_deref(), Some("data:image/jpeg;base64,CCCC"));
}

#[test]
fn test_text_without_image_flushes_at_end() {
    let out = run_in_chunks(&body(&[Fragment::text("Only words.")]), 3);
    assert_eq!(out.len(), 1);
    assert!(matches!(&out[0], Seen::Slide(text, None) if text.contains("Only words.")));
}

#[test]
fn test_image_without_text_gets_blank_caption() {
    let out = run_in_chunks(&body(&[Fragment::image("image/png", "AAAA")]), 10);
    assert_eq!(
        out,
        vec![Seen::Slide(
            " ".to_string(),
            Some("data:image/png;base64,AAAA".to_string())
        )]
    );
}

#[test]
fn test_record_with_no_known_field_is_reported() {
    let out = run_in_chunks(b"{\"thought\":true}\n{\"text\":\"fine\"}\n", 1);
    assert_eq!(out.len(), 2);
    assert!(matches!(&out[0], Seen::Error(m) if m.contains("no text, inlineData or error")));
    assert!(matches!(&out[1], Seen::Slide(text, None) if text.contains("fine")));
}

#[test]
fn test_each_slide_is_emitted_once() {
    let bytes = body(&[
        Fragment::text("One."),
        Fragment::image("image/png", "A"),
        Fragment::text("Two."),
        Fragment::image("image/png", "B"),
    ]);
    let mut assembler = SlideAssembler::new(GenerationId(3), HtmlPipeline::default());
    let mut events = assembler.push_chunk(&bytes);
    events.extend(assembler.finish());
    events.extend(assembler.finish());
    assert_eq!(events.len(), 2);
    assert_eq!(assembler.slides_emitted(), 2);
    assert!(events.iter().all(|e| e.generation() == GenerationId(3)));
}

#[tokio::test]
async fn test_async_adapter_matches_sync_assembler() {
    let bytes = story();
    let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
        bytes.chunks(11).map(|c| Ok(c.to_vec())).collect();
    let assembler = SlideAssembler::new(GenerationId(1), HtmlPipeline::default());
    let events: Vec<AssemblerEvent> = assemble(assembler, stream::iter(chunks)).collect().await;
    assert_eq!(seen(events), run_in_chunks(&bytes, bytes.len()));
}
