//! Fallback source for when the queue runs out
//!
//! The web player keeps music going after the last queued track by pulling
//! a random song from the catalog. The session only sees this trait; how
//! candidates are found is up to the implementor.

use tempo_core::Track;

/// Supplier of tracks to play once the queue is exhausted
pub trait FallbackSource {
    /// Next candidate, or `None` when nothing can be suggested
    ///
    /// Candidates may be unplayable; the session skips those and asks again,
    /// up to its configured attempt limit.
    fn next_candidate(&mut self) -> Option<Track>;
}

impl<F> FallbackSource for F
where
    F: FnMut() -> Option<Track>,
{
    fn next_candidate(&mut self) -> Option<Track> {
        self()
    }
}

/// Fallback over a fixed list of tracks, in order
#[derive(Debug, Clone, Default)]
pub struct ListFallback {
    tracks: std::collections::VecDeque<Track>,
}

impl ListFallback {
    /// Create from tracks that will be handed out front to back
    pub fn new(tracks: impl IntoIterator<Item = Track>) -> Self {
        Self {
            tracks: tracks.into_iter().collect(),
        }
    }

    /// Candidates not yet handed out
    pub fn remaining(&self) -> usize {
        self.tracks.len()
    }
}

impl FallbackSource for ListFallback {
    fn next_candidate(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }
}
