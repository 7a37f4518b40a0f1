//! WASM-compatible Session wrapper

use super::output::JsMediaOutput;
use crate::{
    EventQueue, LoadToken, MediaEvent, PlayOptions, PlaybackConfig, PlaybackError, PlaybackEvent,
    Session,
};
use js_sys::Function;
use tempo_core::Track;
use wasm_bindgen::prelude::*;

/// WASM-compatible playback session
///
/// This wraps the core Session with a JavaScript-friendly API.
#[wasm_bindgen]
pub struct WasmSession {
    inner: Session<JsMediaOutput>,

    // Events already dispatched to callbacks, kept (bounded) for drainEvents
    backlog: EventQueue,

    // Event callbacks
    on_state_change: Option<Function>,
    on_track_change: Option<Function>,
    on_error: Option<Function>,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create a session with default settings driving `output`
    #[wasm_bindgen(constructor)]
    pub fn new(output: JsValue) -> Self {
        Self::build(PlaybackConfig::default(), output)
    }

    /// Create a session from a plain config object
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(output: JsValue, config: JsValue) -> Result<WasmSession, JsValue> {
        let config: PlaybackConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?;
        config.validate().map_err(to_js)?;
        Ok(Self::build(config, output))
    }

    fn build(config: PlaybackConfig, output: JsValue) -> Self {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        Self {
            inner: Session::new(config, JsMediaOutput::new(output)),
            backlog: EventQueue::default(),
            on_state_change: None,
            on_track_change: None,
            on_error: None,
        }
    }

    // ===== Playback Control =====

    /// Play a track, optionally with the list it was picked from
    #[wasm_bindgen(js_name = playTrack)]
    pub fn play_track(
        &mut self,
        track: JsValue,
        queue: JsValue,
        start_index: Option<usize>,
    ) -> Result<(), JsValue> {
        let track: Track = serde_wasm_bindgen::from_value(track)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {}", e)))?;

        let queue: Option<Vec<Track>> = if queue.is_undefined() || queue.is_null() {
            None
        } else {
            Some(
                serde_wasm_bindgen::from_value(queue)
                    .map_err(|e| JsValue::from_str(&format!("Failed to parse queue: {}", e)))?,
            )
        };

        let result = self.inner.play_track(track, PlayOptions { queue, start_index });
        self.dispatch();
        result.map_err(to_js)
    }

    /// Pause when playing, play when paused
    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&mut self) {
        self.inner.toggle_play();
        self.dispatch();
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        self.inner.play();
        self.dispatch();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.inner.pause();
        self.dispatch();
    }

    /// Empty the queue and unload the track
    pub fn stop(&mut self) {
        self.inner.stop();
        self.dispatch();
    }

    /// Skip to next track
    #[wasm_bindgen(js_name = playNext)]
    pub fn play_next(&mut self) -> bool {
        let moved = self.inner.play_next();
        self.dispatch();
        moved
    }

    /// Go to previous track
    #[wasm_bindgen(js_name = playPrevious)]
    pub fn play_previous(&mut self) -> bool {
        let moved = self.inner.play_previous();
        self.dispatch();
        moved
    }

    /// Skip to track at queue index
    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&mut self, index: usize) -> Result<(), JsValue> {
        let result = self.inner.jump_to(index);
        self.dispatch();
        result.map_err(to_js)
    }

    /// Append tracks to the queue
    #[wasm_bindgen(js_name = appendToQueue)]
    pub fn append_to_queue(&mut self, tracks: JsValue) -> Result<(), JsValue> {
        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {}", e)))?;
        self.inner.append_to_queue(tracks);
        self.dispatch();
        Ok(())
    }

    // ===== Seeking & Volume =====

    /// Seek to position in seconds
    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&mut self, seconds: f64) {
        self.inner.seek_to(seconds);
        self.dispatch();
    }

    /// Set volume (0.0-1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: f32) {
        self.inner.set_volume(level);
        self.dispatch();
    }

    /// Mute audio
    pub fn mute(&mut self) {
        self.inner.mute();
        self.dispatch();
    }

    /// Unmute audio
    pub fn unmute(&mut self) {
        self.inner.unmute();
        self.dispatch();
    }

    /// Toggle mute
    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) {
        self.inner.toggle_mute();
        self.dispatch();
    }

    // ===== Media element events =====

    /// Forward a `timeupdate` event
    #[wasm_bindgen(js_name = handleTimeUpdate)]
    pub fn handle_time_update(&mut self, token: u64, position: f64) -> bool {
        self.forward(MediaEvent::TimeUpdate {
            token: LoadToken::from_value(token),
            position,
        })
    }

    /// Forward a `loadedmetadata` event
    #[wasm_bindgen(js_name = handleDurationKnown)]
    pub fn handle_duration_known(&mut self, token: u64, duration: f64) -> bool {
        self.forward(MediaEvent::DurationKnown {
            token: LoadToken::from_value(token),
            duration,
        })
    }

    /// Forward an `ended` event
    #[wasm_bindgen(js_name = handleEnded)]
    pub fn handle_ended(&mut self, token: u64) -> bool {
        self.forward(MediaEvent::Ended {
            token: LoadToken::from_value(token),
        })
    }

    /// Forward an `error` event or a rejected `play()` promise
    #[wasm_bindgen(js_name = handleError)]
    pub fn handle_error(&mut self, token: u64, reason: String) -> bool {
        self.forward(MediaEvent::Failed {
            token: LoadToken::from_value(token),
            reason,
        })
    }

    // ===== State Queries =====

    /// Currently loaded track, or null
    #[wasm_bindgen(js_name = currentTrack)]
    pub fn current_track(&self) -> JsValue {
        self.inner
            .current_track()
            .and_then(|track| serde_wasm_bindgen::to_value(track).ok())
            .unwrap_or(JsValue::NULL)
    }

    /// Check if playing
    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    /// Get current position in seconds
    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    /// Get duration of current track in seconds
    pub fn duration(&self) -> f64 {
        self.inner.duration()
    }

    /// Get current volume (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.inner.volume()
    }

    /// Check if muted
    #[wasm_bindgen(js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.inner.is_muted()
    }

    /// Get current playback state as string
    pub fn state(&self) -> String {
        self.inner.state().as_str().to_string()
    }

    /// Token of the current load, to pass back with element events
    #[wasm_bindgen(js_name = loadToken)]
    pub fn load_token(&self) -> u64 {
        self.inner.load_token().value()
    }

    /// Full player state as a plain object
    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).unwrap_or(JsValue::NULL)
    }

    /// Events since the last call, oldest first
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> JsValue {
        let events = self.backlog.drain();
        serde_wasm_bindgen::to_value(&events).unwrap_or(JsValue::NULL)
    }

    // ===== Event Listeners =====

    /// Register state change callback
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&mut self, callback: Function) {
        self.on_state_change = Some(callback);
    }

    /// Register track change callback
    #[wasm_bindgen(js_name = onTrackChange)]
    pub fn on_track_change(&mut self, callback: Function) {
        self.on_track_change = Some(callback);
    }

    /// Register error callback
    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&mut self, callback: Function) {
        self.on_error = Some(callback);
    }

    // ===== Internal Event Emitters =====

    fn forward(&mut self, event: MediaEvent) -> bool {
        let applied = self.inner.handle_media_event(event);
        self.dispatch();
        applied
    }

    fn dispatch(&mut self) {
        for event in self.inner.drain_events() {
            match &event {
                PlaybackEvent::StateChanged { state } => {
                    if let Some(ref cb) = self.on_state_change {
                        cb.call1(&JsValue::NULL, &JsValue::from_str(state.as_str()))
                            .ok();
                    }
                }
                PlaybackEvent::TrackChanged { .. } => {
                    if let Some(ref cb) = self.on_track_change {
                        cb.call1(&JsValue::NULL, &self.current_track()).ok();
                    }
                }
                PlaybackEvent::Unplayable { track_id } => {
                    let message = PlaybackError::Unplayable(track_id.clone()).to_string();
                    self.emit_error(&message);
                }
                PlaybackEvent::LoadFailed { track_id, message } => {
                    let message =
                        PlaybackError::load_failed(track_id.clone(), message.clone()).to_string();
                    self.emit_error(&message);
                }
                _ => {}
            }
            self.backlog.push(event);
        }
    }

    fn emit_error(&self, message: &str) {
        if let Some(ref cb) = self.on_error {
            cb.call1(&JsValue::NULL, &JsValue::from_str(message)).ok();
        }
    }
}

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
