//! Tempo - Playback Session
//!
//! Platform-agnostic playback session for the Tempo music app.
//!
//! This crate provides:
//! - Play queue with cursor navigation and a configurable edge policy
//! - Transport state (play/pause, position, duration, volume, mute)
//! - A session controller that keeps the two consistent
//! - Stale-report rejection through per-load tokens
//! - End-of-track auto-advance with an optional fallback source
//! - Layered configuration (file + environment)
//!
//! # Architecture
//!
//! `tempo-playback` never touches audio itself. The platform provides a
//! [`MediaOutput`] (an HTML audio element, a native player, a test double)
//! and feeds its reports back as [`MediaEvent`]s tagged with the
//! [`LoadToken`] they were issued for.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use tempo_core::Track;
//! use tempo_playback::{PlayOptions, PlaybackState, Session};
//! use std::time::Duration;
//!
//! let mut session = Session::default();
//!
//! let track = Track::new(
//!     "track1",
//!     "My Song",
//!     "Artist Name",
//!     "https://cdn.example/song.mp3",
//!     Duration::from_secs(180),
//! );
//!
//! session.play_track(track, PlayOptions::default()).unwrap();
//! assert_eq!(session.state(), PlaybackState::Playing);
//!
//! session.set_volume(0.8);
//! session.seek_to(42.0);
//! session.toggle_play();
//! assert!(!session.is_playing());
//! ```
//!
//! # Example: Output Reports
//!
//! ```rust
//! use tempo_core::Track;
//! use tempo_playback::{MediaEvent, PlayOptions, Session};
//! use std::time::Duration;
//!
//! let song = |id: &str| {
//!     Track::new(id, id, "Artist", format!("https://cdn.example/{id}.mp3"), Duration::from_secs(30))
//! };
//!
//! let mut session = Session::default();
//! session.play_track(song("a"), PlayOptions::default()).unwrap();
//! let old = session.load_token();
//!
//! session.play_track(song("b"), PlayOptions::default()).unwrap();
//!
//! // A late report about "a" must not touch "b"
//! assert!(!session.handle_media_event(MediaEvent::Ended { token: old }));
//! assert!(session.is_playing());
//! ```

mod config;
mod error;
mod events;
mod fallback;
mod output;
mod queue;
mod session;
mod transport;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use config::{PlaybackConfig, ENV_PREFIX};
pub use error::{PlaybackError, Result};
pub use events::{EventQueue, MediaEvent, PlaybackEvent, EVENT_QUEUE_CAPACITY};
pub use fallback::{FallbackSource, ListFallback};
pub use output::{MediaOutput, NullOutput};
pub use queue::Queue;
pub use session::{PlayerSnapshot, Session};
pub use transport::Transport;
pub use types::{LoadToken, PlayOptions, PlaybackState, QueueEndPolicy, TrackEndPolicy};
pub use volume::Volume;
