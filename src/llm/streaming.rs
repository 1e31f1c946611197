//! Fragment streams produced by content generators

use std::pin::Pin;

use futures::Stream;

use crate::errors::Result;
use crate::models::Fragment;

/// Ordered fragments from one upstream call; an `Err` item ends the stream
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send>>;

/// Wrapper for a generator's fragment stream
pub struct StreamingResponse {
    stream: FragmentStream,
}

impl StreamingResponse {
    pub fn new(stream: FragmentStream) -> Self {
        Self { stream }
    }

    /// Get the underlying stream
    pub fn into_stream(self) -> FragmentStream {
        self.stream
    }
}
