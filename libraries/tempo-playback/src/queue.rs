//! Play queue
//!
//! Ordered list of tracks with a cursor pointing at the one that is (or will
//! be) loaded. Navigation never reorders or removes tracks, so "previous"
//! can always walk back through what was played.

use crate::types::QueueEndPolicy;
use tempo_core::{Track, TrackId};

/// Play queue with cursor
///
/// Invariant: `cursor` is `Some(i)` with `i < tracks.len()`, or the queue is
/// empty and `cursor` is `None`.
#[derive(Debug, Clone)]
pub struct Queue {
    tracks: Vec<Track>,
    cursor: Option<usize>,
    policy: QueueEndPolicy,
}

impl Queue {
    /// Create new empty queue
    pub fn new(policy: QueueEndPolicy) -> Self {
        Self {
            tracks: Vec::new(),
            cursor: None,
            policy,
        }
    }

    /// Replace the queue and point the cursor at `start_index`
    ///
    /// `start_index` is clamped to the last track. An empty `tracks` leaves
    /// the queue untouched and returns false.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize) -> bool {
        if tracks.is_empty() {
            return false;
        }

        let last = tracks.len() - 1;
        self.tracks = tracks;
        self.cursor = Some(start_index.min(last));
        true
    }

    /// Append tracks after the last one
    ///
    /// If the queue was empty the cursor lands on the first appended track.
    pub fn append(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        self.tracks.extend(tracks);
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
    }

    /// Advance the cursor
    ///
    /// Returns whether the cursor moved. At the last track the edge policy
    /// decides between staying put and wrapping to the first track.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };

        let target = if cursor + 1 < self.tracks.len() {
            cursor + 1
        } else {
            match self.policy {
                QueueEndPolicy::Clamp => cursor,
                QueueEndPolicy::Wrap => 0,
            }
        };

        self.move_to(target)
    }

    /// Move the cursor back one track
    ///
    /// Returns whether the cursor moved. Mirrors `next` at index 0.
    pub fn previous(&mut self) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };

        let target = if cursor > 0 {
            cursor - 1
        } else {
            match self.policy {
                QueueEndPolicy::Clamp => 0,
                QueueEndPolicy::Wrap => self.tracks.len() - 1,
            }
        };

        self.move_to(target)
    }

    /// Move the cursor to an arbitrary track
    ///
    /// Returns false without touching the cursor when `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    /// Cursor position
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// All tracks in play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Position of the first track with the given id
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Whether `next` would move the cursor
    pub fn has_next(&self) -> bool {
        match (self.cursor, self.policy) {
            (None, _) => false,
            (Some(cursor), QueueEndPolicy::Clamp) => cursor + 1 < self.tracks.len(),
            (Some(_), QueueEndPolicy::Wrap) => self.tracks.len() > 1,
        }
    }

    /// Whether `previous` would move the cursor
    pub fn has_previous(&self) -> bool {
        match (self.cursor, self.policy) {
            (None, _) => false,
            (Some(cursor), QueueEndPolicy::Clamp) => cursor > 0,
            (Some(_), QueueEndPolicy::Wrap) => self.tracks.len() > 1,
        }
    }

    /// Edge policy in use
    pub fn policy(&self) -> QueueEndPolicy {
        self.policy
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }

    /// Total number of tracks in queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn move_to(&mut self, target: usize) -> bool {
        if self.cursor == Some(target) {
            return false;
        }
        self.cursor = Some(target);
        true
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new(QueueEndPolicy::default())
    }
}
