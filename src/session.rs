//! Client-side presentation state: subject choices and the active slideshow
//!
//! The slideshow only ever shows one generation. Starting a new one hands out
//! a fresh [`GenerationId`]; events tagged with any other id are dropped, so a
//! superseded stream that keeps delivering can't leak into the display.

use tracing::debug;

use crate::assembler::AssemblerEvent;
use crate::error_channel::ErrorLog;
use crate::models::GenerationId;
use crate::models::Slide;

pub const DEFAULT_ANIMALS: [&str; 4] = ["Tiny Cats", "Tiny Dogs", "Tiny Birds", "Miniature Monkeys"];

pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "Explain how a computer works.",
    "What is photosynthesis?",
    "Tell me about the water cycle.",
];

/// Display list for the most recent generation
#[derive(Debug, Default)]
pub struct Slideshow {
    active: Option<GenerationId>,
    slides: Vec<Slide>,
    errors: ErrorLog,
    loading: bool,
}

impl Slideshow {
    /// Clears the display and makes `generation` the only accepted source
    pub fn begin(&mut self, generation: GenerationId) {
        self.active = Some(generation);
        self.slides.clear();
        self.errors.clear();
        self.loading = true;
    }

    /// Applies an event; returns false when it came from a stale generation
    pub fn apply(&mut self, event: AssemblerEvent) -> bool {
        if !self.is_active(event.generation()) {
            debug!(generation = %event.generation(), "dropping event from superseded generation");
            return false;
        }
        match event {
            AssemblerEvent::Slide(slide) => self.slides.push(slide),
            AssemblerEvent::Error { message, .. } => self.errors.append(&message),
        }
        true
    }

    /// Records a request-level failure for `generation`
    pub fn fail(&mut self, generation: GenerationId, message: &str) {
        if self.is_active(generation) {
            self.errors.set_top_level(message);
            self.loading = false;
        }
    }

    /// Marks `generation` as done streaming
    pub fn complete(&mut self, generation: GenerationId) {
        if self.is_active(generation) {
            self.loading = false;
        }
    }

    pub fn is_active(&self, generation: GenerationId) -> bool {
        self.active == Some(generation)
    }

    pub fn active(&self) -> Option<GenerationId> {
        self.active
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Subject list, current selection and slideshow for one user session
#[derive(Debug)]
pub struct StorySession {
    animals: Vec<String>,
    selected: String,
    last_generation: GenerationId,
    slideshow: Slideshow,
}

impl Default for StorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl StorySession {
    pub fn new() -> Self {
        let animals: Vec<String> = DEFAULT_ANIMALS.iter().map(ToString::to_string).collect();
        let selected = animals[0].clone();
        Self {
            animals,
            selected,
            last_generation: GenerationId::default(),
            slideshow: Slideshow::default(),
        }
    }

    pub fn animals(&self) -> &[String] {
        &self.animals
    }

    pub fn selected_animal(&self) -> &str {
        &self.selected
    }

    pub fn select_animal(&mut self, animal: &str) {
        self.selected = animal.to_string();
    }

    /// Adds a user-supplied subject and selects it. Blank input is ignored;
    /// returns whether the list grew.
    pub fn add_custom_animal(&mut self, animal: &str) -> bool {
        let animal = animal.trim();
        if animal.is_empty() {
            return false;
        }
        let added = if self.animals.iter().any(|a| a == animal) {
            false
        } else {
            self.animals.push(animal.to_string());
            true
        };
        self.selected = animal.to_string();
        added
    }

    /// Supersedes any in-flight generation and returns the new one's id
    pub fn begin_generation(&mut self) -> GenerationId {
        self.last_generation = self.last_generation.next();
        self.slideshow.begin(self.last_generation);
        self.last_generation
    }

    pub fn slideshow(&self) -> &Slideshow {
        &self.slideshow
    }

    pub fn slideshow_mut(&mut self) -> &mut Slideshow {
        &mut self.slideshow
    }
}
