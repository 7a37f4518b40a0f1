//! Transport state
//!
//! Logical play/pause/position/volume state of whatever track is loaded.
//! The audio output mirrors it; this type never talks to the output itself.

use crate::types::{LoadToken, PlaybackState};
use crate::volume::Volume;
use tempo_core::Track;

/// Transport state for the loaded track
///
/// Invariants:
/// - `is_playing` is false while no track is loaded
/// - `0 <= current_time <= duration`
/// - `current_time` is 0 right after every `load`
#[derive(Debug, Clone)]
pub struct Transport {
    track: Option<Track>,
    token: LoadToken,
    is_playing: bool,
    ended: bool,
    current_time: f64,
    duration: f64,
    volume: Volume,
}

impl Transport {
    /// Create an empty transport
    pub fn new(volume: f32) -> Self {
        Self {
            track: None,
            token: LoadToken::default(),
            is_playing: false,
            ended: false,
            current_time: 0.0,
            duration: 0.0,
            volume: Volume::new(volume),
        }
    }

    /// Load a track, paused at position 0
    ///
    /// Duration starts at the track's nominal length until the output reports
    /// the real one. Returns the token that events for this load must carry.
    pub fn load(&mut self, track: Track) -> LoadToken {
        self.token = self.token.next();
        self.duration = track.duration.as_secs_f64();
        self.current_time = 0.0;
        self.is_playing = false;
        self.ended = false;
        self.track = Some(track);
        self.token
    }

    /// Drop the loaded track
    pub fn unload(&mut self) {
        self.token = self.token.next();
        self.track = None;
        self.is_playing = false;
        self.ended = false;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    /// Start playing
    ///
    /// No-op without a track. A finished track starts over from 0.
    /// Returns whether anything changed.
    pub fn play(&mut self) -> bool {
        if self.track.is_none() || self.is_playing {
            return false;
        }
        if self.ended {
            self.ended = false;
            self.current_time = 0.0;
        }
        self.is_playing = true;
        true
    }

    /// Stop playing, keeping the position
    ///
    /// Returns whether anything changed.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing {
            return false;
        }
        self.is_playing = false;
        true
    }

    /// `play` when paused, `pause` when playing
    ///
    /// Returns whether anything changed (false without a track).
    pub fn toggle(&mut self) -> bool {
        if self.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Move the position, clamped to `[0, duration]`
    ///
    /// Never changes `is_playing`. NaN and seeks without a track are ignored.
    /// Returns the new position.
    pub fn seek(&mut self, seconds: f64) -> Option<f64> {
        if self.track.is_none() || seconds.is_nan() {
            return None;
        }
        self.current_time = seconds.clamp(0.0, self.duration);
        if self.current_time < self.duration {
            self.ended = false;
        }
        Some(self.current_time)
    }

    /// Set volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, level: f32) -> bool {
        self.volume.set_level(level)
    }

    /// Volume controller
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Volume controller (mutable, for mute handling)
    pub fn volume_mut(&mut self) -> &mut Volume {
        &mut self.volume
    }

    // ===== Token-checked updates from the audio output =====

    /// Whether `token` belongs to the loaded track
    pub fn is_current(&self, token: LoadToken) -> bool {
        self.track.is_some() && token == self.token
    }

    /// Position report from the output
    pub fn update_position(&mut self, token: LoadToken, seconds: f64) -> bool {
        if !self.is_current(token) || !seconds.is_finite() {
            return false;
        }
        self.current_time = seconds.clamp(0.0, self.duration);
        true
    }

    /// Real duration reported once the media is decoded
    pub fn update_duration(&mut self, token: LoadToken, seconds: f64) -> bool {
        if !self.is_current(token) || !seconds.is_finite() || seconds < 0.0 {
            return false;
        }
        self.duration = seconds;
        self.current_time = self.current_time.min(seconds);
        true
    }

    /// Output reached the end of the media
    pub fn mark_ended(&mut self, token: LoadToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.is_playing = false;
        self.ended = true;
        self.current_time = self.duration;
        true
    }

    /// Output failed to fetch or decode the media
    ///
    /// The track stays loaded so the user can retry.
    pub fn mark_failed(&mut self, token: LoadToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.is_playing = false;
        true
    }

    // ===== Queries =====

    /// Loaded track
    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    /// Token of the current load
    pub fn token(&self) -> LoadToken {
        self.token
    }

    /// Whether audio is playing
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Position in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Derived state
    pub fn state(&self) -> PlaybackState {
        if self.track.is_none() {
            PlaybackState::Empty
        } else if self.is_playing {
            PlaybackState::Playing
        } else if self.ended {
            PlaybackState::Ended
        } else {
            PlaybackState::Paused
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(Volume::default().level())
    }
}
