//! Error types for playback management

use tempo_core::TrackId;
use thiserror::Error;

/// Playback errors
///
/// None of these are fatal; the session stays usable after every one of them.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Track has no usable media reference
    #[error("Track {0} has no playable media")]
    Unplayable(TrackId),

    /// Audio output could not fetch or decode the track
    #[error("Failed to load track {track_id}: {reason}")]
    LoadFailed { track_id: TrackId, reason: String },

    /// Media output refused a command
    #[error("Media output error: {0}")]
    Output(String),

    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlaybackError {
    /// Create a load failure error
    pub fn load_failed(track_id: TrackId, reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            track_id,
            reason: reason.into(),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
