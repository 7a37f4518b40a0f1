//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;
use tempo_core::Track;

/// Transport state as seen by the player bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No track loaded
    Empty,

    /// Track loaded, not playing
    Paused,

    /// Currently playing
    Playing,

    /// Output reached the end of the loaded track
    Ended,
}

impl PlaybackState {
    /// Lowercase name used by the web bindings and logs
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Empty => "empty",
            PlaybackState::Paused => "paused",
            PlaybackState::Playing => "playing",
            PlaybackState::Ended => "ended",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `next`/`previous` do at the edges of the queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueEndPolicy {
    /// Stay on the first/last track
    #[default]
    Clamp,

    /// Continue from the other end
    Wrap,
}

/// What happens when the loaded track finishes on its own
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackEndPolicy {
    /// Behave like `play_next`, then ask the fallback source if the queue is done
    #[default]
    AutoAdvance,

    /// Stay on the finished track
    Stop,
}

/// Optional queue context for `Session::play_track`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayOptions {
    /// Tracks to play through, replacing the current queue
    pub queue: Option<Vec<Track>>,

    /// Index of the requested track within `queue`
    pub start_index: Option<usize>,
}

impl PlayOptions {
    /// Play from a list, starting at `start_index`
    pub fn from_queue(queue: Vec<Track>, start_index: usize) -> Self {
        Self {
            queue: Some(queue),
            start_index: Some(start_index),
        }
    }
}

/// Generation stamped on every track load
///
/// Events from the audio output carry the token of the load they belong to,
/// so reports about a track that is no longer loaded can be recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Raw generation number
    pub fn value(self) -> u64 {
        self.0
    }

    /// Rebuild a token handed across an FFI boundary
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
