//! Playback events
//!
//! Two directions:
//! - [`MediaEvent`]: reports from the audio output, tagged with the load token
//! - [`PlaybackEvent`]: notifications for UI consumers, drained from the session

use crate::types::{LoadToken, PlaybackState};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tempo_core::TrackId;

/// Events kept for a consumer that has not drained yet
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Report from the audio output about one load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// Playback position moved
    TimeUpdate {
        /// Load the report belongs to
        token: LoadToken,
        /// Position in seconds
        position: f64,
    },

    /// Real media duration became known
    DurationKnown {
        /// Load the report belongs to
        token: LoadToken,
        /// Duration in seconds
        duration: f64,
    },

    /// Media played to the end
    Ended {
        /// Load the report belongs to
        token: LoadToken,
    },

    /// Media could not be fetched or decoded
    Failed {
        /// Load the report belongs to
        token: LoadToken,
        /// Output-specific description
        reason: String,
    },
}

impl MediaEvent {
    /// Token of the load this event refers to
    pub fn token(&self) -> LoadToken {
        match self {
            MediaEvent::TimeUpdate { token, .. }
            | MediaEvent::DurationKnown { token, .. }
            | MediaEvent::Ended { token }
            | MediaEvent::Failed { token, .. } => *token,
        }
    }
}

/// Events emitted by the session for UI synchronization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Transport state changed (playing, paused, ended, empty)
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// A different track was loaded
    TrackChanged {
        /// ID of the new track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Position or duration changed
    PositionUpdate {
        /// Position in seconds
        position: f64,
        /// Duration in seconds
        duration: f64,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Queue contents or cursor changed
    QueueChanged {
        /// New queue length
        length: usize,
        /// Cursor position
        cursor: Option<usize>,
    },

    /// Track finished playing naturally
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Requested track has no playable media
    Unplayable {
        /// ID of the rejected track
        track_id: TrackId,
    },

    /// Audio output failed to load the track
    LoadFailed {
        /// ID of the track that failed
        track_id: TrackId,
        /// Error message
        message: String,
    },
}

/// Bounded queue of pending UI events
///
/// Consecutive position updates collapse into the latest one, so a steady
/// stream of output time reports costs one slot. When full, the oldest
/// event is dropped.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<PlaybackEvent>,
    capacity: usize,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` events (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Add an event
    pub fn push(&mut self, event: PlaybackEvent) {
        if matches!(event, PlaybackEvent::PositionUpdate { .. })
            && matches!(self.events.back(), Some(PlaybackEvent::PositionUpdate { .. }))
        {
            self.events.pop_back();
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Take all events, oldest first
    pub fn drain(&mut self) -> Vec<PlaybackEvent> {
        self.events.drain(..).collect()
    }

    /// Number of events waiting
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(EVENT_QUEUE_CAPACITY)
    }
}
