//! Playback session - core orchestration
//!
//! Binds the queue, the transport state and the platform output together.
//! UI code talks to the player only through a `Session`.

use crate::{
    config::PlaybackConfig,
    error::{PlaybackError, Result},
    events::{EventQueue, MediaEvent, PlaybackEvent},
    fallback::FallbackSource,
    output::{MediaOutput, NullOutput},
    queue::Queue,
    transport::Transport,
    types::{LoadToken, PlayOptions, PlaybackState, TrackEndPolicy},
};
use serde::Serialize;
use tempo_core::Track;
use tracing::{debug, info, warn};

/// Read model of the player, for rendering the player bar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub current_track: Option<Track>,
    pub state: PlaybackState,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f32,
    pub is_muted: bool,
    pub queue_length: usize,
    pub cursor: Option<usize>,
}

/// Central playback session
///
/// One session exists per application. It is created at start-up, handed to
/// every component that needs playback, and torn down with [`Session::shutdown`].
///
/// Orchestrates:
/// - Queue navigation (next/previous/jump, edge policy)
/// - Transport state (play/pause, seek, volume, mute)
/// - Mirroring every change onto the platform output
/// - Applying output reports, ignoring the ones about replaced loads
/// - End-of-track handling and the optional fallback source
pub struct Session<O: MediaOutput = NullOutput> {
    config: PlaybackConfig,

    queue: Queue,
    transport: Transport,

    output: O,
    fallback: Option<Box<dyn FallbackSource>>,

    // Set when the loaded track could not start; the next play loads it again
    needs_reload: bool,

    // Event queue for UI synchronization
    pending_events: EventQueue,
}

impl<O: MediaOutput> Session<O> {
    /// Create a new session driving `output`
    pub fn new(config: PlaybackConfig, mut output: O) -> Self {
        let transport = Transport::new(config.volume);
        output.set_volume(transport.volume().gain());

        Self {
            queue: Queue::new(config.queue_end),
            transport,
            output,
            fallback: None,
            needs_reload: false,
            pending_events: EventQueue::default(),
            config,
        }
    }

    /// Install a fallback source for when the queue runs out
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl FallbackSource + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Replace or remove the fallback source
    pub fn set_fallback(&mut self, fallback: Option<Box<dyn FallbackSource>>) {
        self.fallback = fallback;
    }

    // ===== Playback Control =====

    /// Play a track, optionally as part of a list
    ///
    /// Without a queue in `options` the track becomes a single-item queue.
    /// With one, the cursor starts at `start_index`, or at the track's
    /// position in the list, or at 0.
    ///
    /// Tracks without playable media are rejected before anything changes.
    pub fn play_track(&mut self, track: Track, options: PlayOptions) -> Result<()> {
        if !track.is_playable() {
            warn!(track_id = %track.id, "refusing to play track without media");
            self.emit(PlaybackEvent::Unplayable {
                track_id: track.id.clone(),
            });
            return Err(PlaybackError::Unplayable(track.id));
        }

        if self.config.same_track_toggles
            && self.transport.track().is_some_and(|t| t.id == track.id)
        {
            self.toggle_play();
            return Ok(());
        }

        let PlayOptions { queue, start_index } = options;
        match queue.filter(|tracks| !tracks.is_empty()) {
            Some(tracks) => {
                let start = start_index
                    .or_else(|| tracks.iter().position(|t| t.id == track.id))
                    .unwrap_or(0);
                self.queue.set_queue(tracks, start);
            }
            None => {
                self.queue.set_queue(vec![track.clone()], 0);
            }
        }
        self.emit_queue_changed();

        self.load_and_play(track)
    }

    /// Start or resume playback
    ///
    /// No-op without a track. A finished track starts over; a track the
    /// output failed on is loaded again.
    pub fn play(&mut self) {
        if self.needs_reload {
            if let Some(track) = self.transport.track().cloned() {
                debug!(track_id = %track.id, "retrying failed track");
                if let Err(e) = self.load_and_play(track) {
                    debug!(error = %e, "retry failed");
                }
            }
            return;
        }

        let was_ended = self.transport.state() == PlaybackState::Ended;
        if !self.transport.play() {
            return;
        }
        if was_ended {
            self.output.seek(0.0);
        }
        if let Err(e) = self.output.play() {
            self.fail_current(e.to_string());
            return;
        }

        debug!("playback started");
        self.emit_state_changed();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.transport.pause() {
            self.output.pause();
            debug!(position = self.transport.current_time(), "playback paused");
            self.emit_state_changed();
        }
    }

    /// Pause when playing, play when paused
    ///
    /// No-op without a track.
    pub fn toggle_play(&mut self) {
        if self.transport.track().is_none() {
            return;
        }

        if self.transport.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Skip to next track
    ///
    /// Returns whether a different track was loaded. At the end of the queue
    /// (with the clamp policy) nothing happens and the current track keeps
    /// playing.
    pub fn play_next(&mut self) -> bool {
        if !self.queue.next() {
            debug!("no next track in queue");
            return false;
        }
        self.emit_queue_changed();
        self.play_queue_current()
    }

    /// Go to previous track
    ///
    /// With `restart_threshold_secs` configured and the position past it,
    /// restarts the current track instead. Returns whether a different track
    /// was loaded.
    pub fn play_previous(&mut self) -> bool {
        if let Some(threshold) = self.config.restart_threshold_secs {
            if self.transport.track().is_some() && self.transport.current_time() > threshold {
                self.seek_to(0.0);
                return false;
            }
        }

        if !self.queue.previous() {
            debug!("no previous track in queue");
            return false;
        }
        self.emit_queue_changed();
        self.play_queue_current()
    }

    /// Skip to the track at `index` in the queue
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        if !self.queue.jump_to(index) {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.emit_queue_changed();

        let track = self
            .queue
            .current()
            .cloned()
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;
        self.load_and_play(track)
    }

    /// Empty the queue and unload the current track
    pub fn stop(&mut self) {
        self.output.pause();
        self.queue.clear();
        self.transport.unload();
        self.needs_reload = false;
        info!("playback stopped");
        self.emit_queue_changed();
        self.emit_state_changed();
    }

    // ===== Seek =====

    /// Seek to a position in seconds, clamped to the track
    pub fn seek_to(&mut self, seconds: f64) {
        if let Some(position) = self.transport.seek(seconds) {
            self.output.seek(position);
            self.emit_position();
        }
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0, clamped)
    pub fn set_volume(&mut self, level: f32) {
        if self.transport.set_volume(level) {
            self.sync_volume();
        }
    }

    /// Mute audio
    pub fn mute(&mut self) {
        self.transport.volume_mut().mute();
        self.sync_volume();
    }

    /// Unmute audio
    pub fn unmute(&mut self) {
        self.transport.volume_mut().unmute();
        self.sync_volume();
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.transport.volume_mut().toggle_mute();
        self.sync_volume();
    }

    // ===== Queue Management =====

    /// Append tracks to the end of the queue without changing what plays
    ///
    /// With nothing loaded, the first appended track is loaded paused so
    /// that play starts from it.
    pub fn append_to_queue(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        self.queue.append(tracks);
        self.emit_queue_changed();

        if self.transport.track().is_none() {
            if let Some(track) = self.queue.current().cloned() {
                self.cue(track);
            }
        }
    }

    // ===== Output reports =====

    /// Apply a report from the output
    ///
    /// Reports about a load that has since been replaced are ignored.
    /// Returns whether the event was applied.
    pub fn handle_media_event(&mut self, event: MediaEvent) -> bool {
        let token = event.token();
        if !self.transport.is_current(token) {
            debug!(
                event_token = %token,
                current_token = %self.transport.token(),
                "ignoring stale media event"
            );
            return false;
        }

        match event {
            MediaEvent::TimeUpdate { position, .. } => {
                let applied = self.transport.update_position(token, position);
                if applied {
                    self.emit_position();
                }
                applied
            }
            MediaEvent::DurationKnown { duration, .. } => {
                let applied = self.transport.update_duration(token, duration);
                if applied {
                    debug!(duration, "media duration known");
                    self.emit_position();
                }
                applied
            }
            MediaEvent::Ended { .. } => {
                self.transport.mark_ended(token);
                if let Some(track) = self.transport.track() {
                    let track_id = track.id.clone();
                    debug!(track_id = %track_id, "track finished");
                    self.emit(PlaybackEvent::TrackFinished { track_id });
                }
                self.emit_state_changed();
                self.handle_track_finished();
                true
            }
            MediaEvent::Failed { reason, .. } => {
                self.fail_current(reason);
                true
            }
        }
    }

    // ===== State Queries =====

    /// Currently loaded track
    pub fn current_track(&self) -> Option<&Track> {
        self.transport.track()
    }

    /// Whether audio is playing
    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Position in seconds
    pub fn current_time(&self) -> f64 {
        self.transport.current_time()
    }

    /// Duration of the loaded track in seconds
    pub fn duration(&self) -> f64 {
        self.transport.duration()
    }

    /// Volume level (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.transport.volume().level()
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.transport.volume().is_muted()
    }

    /// Current transport state
    pub fn state(&self) -> PlaybackState {
        self.transport.state()
    }

    /// Token of the current load, to tag output events with
    pub fn load_token(&self) -> LoadToken {
        self.transport.token()
    }

    /// The play queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Session configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// The platform output
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The platform output (mutable)
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Everything the player bar renders, in one value
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_track: self.transport.track().cloned(),
            state: self.transport.state(),
            is_playing: self.transport.is_playing(),
            current_time: self.transport.current_time(),
            duration: self.transport.duration(),
            volume: self.transport.volume().level(),
            is_muted: self.transport.volume().is_muted(),
            queue_length: self.queue.len(),
            cursor: self.queue.cursor(),
        }
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns events accumulated since the last drain, oldest first.
    /// Consecutive position updates arrive as one, and only the newest
    /// [`EVENT_QUEUE_CAPACITY`](crate::EVENT_QUEUE_CAPACITY) events are kept.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.pending_events.drain()
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Lifecycle =====

    /// Tear the session down, pausing and returning the output
    pub fn shutdown(mut self) -> O {
        self.output.pause();
        self.transport.unload();
        info!("playback session shut down");
        self.output
    }

    // ===== Internal =====

    /// Load a track into the transport and output, then start playing
    fn load_and_play(&mut self, track: Track) -> Result<()> {
        let previous_track_id = self.transport.track().map(|t| t.id.clone());
        let track_id = track.id.clone();
        let url = track.playable_url().map(str::to_owned);

        let token = self.transport.load(track);
        self.needs_reload = false;
        info!(track_id = %track_id, token = %token, "loading track");

        self.emit(PlaybackEvent::TrackChanged {
            track_id: track_id.clone(),
            previous_track_id,
        });
        self.emit_position();

        let Some(url) = url else {
            // Only reachable through queue navigation; direct requests are
            // rejected in play_track
            warn!(track_id = %track_id, "queued track has no playable media");
            self.output.pause();
            self.needs_reload = true;
            self.emit(PlaybackEvent::Unplayable {
                track_id: track_id.clone(),
            });
            self.emit_state_changed();
            return Err(PlaybackError::Unplayable(track_id));
        };

        if let Err(e) = self.output.load(token, &url) {
            return Err(self.fail_current(e.to_string()));
        }

        self.transport.play();
        if let Err(e) = self.output.play() {
            return Err(self.fail_current(e.to_string()));
        }

        self.emit_state_changed();
        Ok(())
    }

    /// Load a track into the transport and output without starting it
    fn cue(&mut self, track: Track) {
        let previous_track_id = self.transport.track().map(|t| t.id.clone());
        let track_id = track.id.clone();
        let url = track.playable_url().map(str::to_owned);

        let token = self.transport.load(track);
        self.needs_reload = false;
        debug!(track_id = %track_id, token = %token, "cueing track");

        self.emit(PlaybackEvent::TrackChanged {
            track_id: track_id.clone(),
            previous_track_id,
        });
        self.emit_position();

        match url {
            Some(url) => {
                if let Err(e) = self.output.load(token, &url) {
                    self.fail_current(e.to_string());
                    return;
                }
            }
            None => {
                warn!(track_id = %track_id, "queued track has no playable media");
                self.needs_reload = true;
                self.emit(PlaybackEvent::Unplayable { track_id });
            }
        }
        self.emit_state_changed();
    }

    /// Load whatever the queue cursor points at
    ///
    /// Returns true: the track changed even when loading it failed, and
    /// failures are reported through events.
    fn play_queue_current(&mut self) -> bool {
        let Some(track) = self.queue.current().cloned() else {
            return false;
        };
        if let Err(e) = self.load_and_play(track) {
            debug!(error = %e, "queued track did not start");
        }
        true
    }

    /// Put the loaded track into the failed state and report it
    fn fail_current(&mut self, reason: String) -> PlaybackError {
        let token = self.transport.token();
        self.transport.mark_failed(token);
        self.output.pause();
        self.needs_reload = true;

        let Some(track_id) = self.transport.track().map(|t| t.id.clone()) else {
            return PlaybackError::NoTrackLoaded;
        };
        warn!(track_id = %track_id, reason = %reason, "track failed to load");
        self.emit(PlaybackEvent::LoadFailed {
            track_id: track_id.clone(),
            message: reason.clone(),
        });
        self.emit_state_changed();
        PlaybackError::load_failed(track_id, reason)
    }

    /// Apply the end-of-track policy
    fn handle_track_finished(&mut self) {
        match self.config.track_end {
            TrackEndPolicy::Stop => {}
            TrackEndPolicy::AutoAdvance => {
                if !self.play_next() {
                    self.play_fallback();
                }
            }
        }
    }

    /// Ask the fallback source for something to play after the queue
    fn play_fallback(&mut self) {
        let Some(mut fallback) = self.fallback.take() else {
            return;
        };

        let mut found = None;
        for attempt in 1..=self.config.max_fallback_attempts {
            let Some(candidate) = fallback.next_candidate() else {
                break;
            };
            if candidate.is_playable() {
                found = Some(candidate);
                break;
            }
            debug!(track_id = %candidate.id, attempt, "skipping unplayable fallback candidate");
        }
        self.fallback = Some(fallback);

        let Some(track) = found else {
            warn!(
                attempts = self.config.max_fallback_attempts,
                "fallback source gave nothing playable"
            );
            return;
        };

        info!(track_id = %track.id, "queue finished, continuing with fallback track");
        self.queue.set_queue(vec![track.clone()], 0);
        self.emit_queue_changed();
        if let Err(e) = self.load_and_play(track) {
            debug!(error = %e, "fallback track did not start");
        }
    }

    fn sync_volume(&mut self) {
        let volume = self.transport.volume();
        let (gain, level, is_muted) = (volume.gain(), volume.level(), volume.is_muted());
        self.output.set_volume(gain);
        self.emit(PlaybackEvent::VolumeChanged { level, is_muted });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }

    fn emit_state_changed(&mut self) {
        let state = self.transport.state();
        self.emit(PlaybackEvent::StateChanged { state });
    }

    fn emit_position(&mut self) {
        let (position, duration) = (self.transport.current_time(), self.transport.duration());
        self.emit(PlaybackEvent::PositionUpdate { position, duration });
    }

    fn emit_queue_changed(&mut self) {
        let (length, cursor) = (self.queue.len(), self.queue.cursor());
        self.emit(PlaybackEvent::QueueChanged { length, cursor });
    }
}

impl Default for Session<NullOutput> {
    fn default() -> Self {
        Self::new(PlaybackConfig::default(), NullOutput)
    }
}
