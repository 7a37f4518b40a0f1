//! Integration tests for the playback session
//!
//! These tests drive a session the way the web player does: UI requests,
//! then reports from the media output, then assertions on what the player
//! bar would render.

use std::collections::HashSet;
use std::time::Duration;
use tempo_core::{Track, TrackId};
use tempo_playback::{
    ListFallback, LoadToken, MediaEvent, MediaOutput, PlayOptions, PlaybackConfig, PlaybackError,
    PlaybackEvent, PlaybackState, QueueEndPolicy, Session, TrackEndPolicy,
};

// ===== Test Helpers =====

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("tempo_playback=debug")
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Load(LoadToken, String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
}

/// Output that records every command and can refuse chosen media
#[derive(Default)]
struct RecordingOutput {
    commands: Vec<Command>,
    broken_urls: HashSet<String>,
    refuse_play: bool,
}

impl RecordingOutput {
    fn with_broken(url: &str) -> Self {
        Self {
            broken_urls: HashSet::from([url.to_string()]),
            ..Default::default()
        }
    }

    fn loads(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Load(_, url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    fn last(&self) -> Option<&Command> {
        self.commands.last()
    }
}

impl MediaOutput for RecordingOutput {
    fn load(&mut self, token: LoadToken, url: &str) -> tempo_playback::Result<()> {
        self.commands.push(Command::Load(token, url.to_string()));
        if self.broken_urls.contains(url) {
            return Err(PlaybackError::Output(format!("cannot fetch {url}")));
        }
        Ok(())
    }

    fn play(&mut self) -> tempo_playback::Result<()> {
        self.commands.push(Command::Play);
        if self.refuse_play {
            return Err(PlaybackError::Output("autoplay blocked".to_string()));
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.commands.push(Command::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        self.commands.push(Command::Seek(seconds));
    }

    fn set_volume(&mut self, level: f32) {
        self.commands.push(Command::SetVolume(level));
    }
}

fn song(id: &str) -> Track {
    Track::new(
        id,
        format!("Song {id}"),
        "Test Artist",
        url(id),
        Duration::from_secs(200),
    )
}

fn url(id: &str) -> String {
    format!("https://cdn.example/{id}.mp3")
}

fn abc() -> Vec<Track> {
    vec![song("a"), song("b"), song("c")]
}

fn session_with(config: PlaybackConfig) -> Session<RecordingOutput> {
    init_tracing();
    Session::new(config, RecordingOutput::default())
}

fn current_id<O: MediaOutput>(session: &Session<O>) -> Option<&str> {
    session.current_track().map(|t| t.id.as_str())
}

// ===== Queue scenarios =====

#[test]
fn test_queue_navigation_with_clamp() {
    let mut session = session_with(PlaybackConfig::default());
    let tracks = abc();

    session
        .play_track(tracks[1].clone(), PlayOptions::from_queue(tracks, 1))
        .unwrap();
    assert_eq!(current_id(&session), Some("b"));

    assert!(session.play_next());
    assert_eq!(current_id(&session), Some("c"));

    // Clamp: stays on C and keeps playing
    assert!(!session.play_next());
    assert_eq!(current_id(&session), Some("c"));
    assert!(session.is_playing());

    assert!(session.play_previous());
    assert_eq!(current_id(&session), Some("b"));

    assert_eq!(
        session.output().loads(),
        vec![url("b"), url("c"), url("b")]
    );
}

#[test]
fn test_queue_navigation_with_wrap() {
    let mut session = session_with(PlaybackConfig {
        queue_end: QueueEndPolicy::Wrap,
        ..Default::default()
    });
    let tracks = abc();

    session
        .play_track(tracks[2].clone(), PlayOptions::from_queue(tracks, 2))
        .unwrap();

    assert!(session.play_next());
    assert_eq!(current_id(&session), Some("a"));

    assert!(session.play_previous());
    assert_eq!(current_id(&session), Some("c"));
}

#[test]
fn test_single_track_queue() {
    let mut session = session_with(PlaybackConfig::default());

    session.play_track(song("a"), PlayOptions::default()).unwrap();
    assert_eq!(session.queue().len(), 1);

    assert!(!session.play_next());
    assert!(!session.play_previous());
    assert_eq!(current_id(&session), Some("a"));
    assert_eq!(session.output().loads().len(), 1);
}

#[test]
fn test_play_track_resets_position() {
    let mut session = session_with(PlaybackConfig::default());
    let tracks = abc();

    session
        .play_track(tracks[0].clone(), PlayOptions::from_queue(tracks.clone(), 0))
        .unwrap();
    session.seek_to(95.0);
    assert_eq!(session.current_time(), 95.0);

    session
        .play_track(tracks[2].clone(), PlayOptions::from_queue(tracks, 2))
        .unwrap();
    assert_eq!(current_id(&session), Some("c"));
    assert_eq!(session.current_time(), 0.0);
    assert_eq!(session.duration(), 200.0);
}

#[test]
fn test_jump_to_loads_track() {
    let mut session = session_with(PlaybackConfig::default());
    let tracks = abc();

    session
        .play_track(tracks[0].clone(), PlayOptions::from_queue(tracks, 0))
        .unwrap();
    session.jump_to(2).unwrap();

    assert_eq!(current_id(&session), Some("c"));
    assert_eq!(session.queue().cursor(), Some(2));
    assert!(session.is_playing());
}

#[test]
fn test_restart_threshold_on_previous() {
    let mut session = session_with(PlaybackConfig {
        restart_threshold_secs: Some(3.0),
        ..Default::default()
    });
    let tracks = abc();

    session
        .play_track(tracks[1].clone(), PlayOptions::from_queue(tracks, 1))
        .unwrap();
    session.seek_to(10.0);

    // Past the threshold: restart instead of going back
    assert!(!session.play_previous());
    assert_eq!(current_id(&session), Some("b"));
    assert_eq!(session.current_time(), 0.0);

    // At the start: go back
    assert!(session.play_previous());
    assert_eq!(current_id(&session), Some("a"));
}

#[test]
fn test_append_after_stop_starts_from_first_appended() {
    let mut session = session_with(PlaybackConfig::default());
    session.play_track(song("x"), PlayOptions::default()).unwrap();
    session.stop();

    session.append_to_queue(vec![song("a"), song("b")]);
    assert_eq!(current_id(&session), Some("a"));
    assert_eq!(session.state(), PlaybackState::Paused);
    // Cued, not started
    assert!(matches!(session.output().last(), Some(Command::Load(_, u)) if *u == url("a")));

    session.toggle_play();
    assert!(session.is_playing());
    assert_eq!(session.output().last(), Some(&Command::Play));

    assert!(session.play_next());
    assert_eq!(current_id(&session), Some("b"));
    assert_eq!(session.output().loads(), vec![url("x"), url("a"), url("b")]);
}

// ===== Transport =====

#[test]
fn test_toggle_and_seek_reach_output() {
    let mut session = session_with(PlaybackConfig::default());
    session.play_track(song("a"), PlayOptions::default()).unwrap();

    session.toggle_play();
    assert!(!session.is_playing());
    assert_eq!(session.output().last(), Some(&Command::Pause));

    session.seek_to(500.0);
    assert_eq!(session.current_time(), 200.0);
    assert_eq!(session.output().last(), Some(&Command::Seek(200.0)));

    session.seek_to(-5.0);
    assert_eq!(session.current_time(), 0.0);

    session.toggle_play();
    assert!(session.is_playing());
    assert_eq!(session.output().last(), Some(&Command::Play));
}

#[test]
fn test_volume_and_mute_reach_output() {
    let mut session = session_with(PlaybackConfig::default());
    assert_eq!(
        session.output().commands.first(),
        Some(&Command::SetVolume(0.7))
    );

    session.set_volume(1.5);
    assert_eq!(session.volume(), 1.0);

    session.mute();
    assert!(session.is_muted());
    assert_eq!(session.volume(), 1.0);
    assert_eq!(session.output().last(), Some(&Command::SetVolume(0.0)));

    session.toggle_mute();
    assert_eq!(session.output().last(), Some(&Command::SetVolume(1.0)));

    session.set_volume(-0.2);
    assert_eq!(session.volume(), 0.0);
}

// ===== Output reports =====

#[test]
fn test_stale_events_are_ignored() {
    let mut session = session_with(PlaybackConfig::default());

    session.play_track(song("x"), PlayOptions::default()).unwrap();
    let token_x = session.load_token();

    session.play_track(song("y"), PlayOptions::default()).unwrap();
    let token_y = session.load_token();
    assert_ne!(token_x, token_y);

    // Late reports about X arrive after Y was requested
    assert!(!session.handle_media_event(MediaEvent::DurationKnown {
        token: token_x,
        duration: 12.0,
    }));
    assert!(!session.handle_media_event(MediaEvent::Ended { token: token_x }));
    assert!(!session.handle_media_event(MediaEvent::Failed {
        token: token_x,
        reason: "aborted".to_string(),
    }));

    assert_eq!(current_id(&session), Some("y"));
    assert_eq!(session.duration(), 200.0);
    assert!(session.is_playing());

    // Reports about Y apply
    assert!(session.handle_media_event(MediaEvent::DurationKnown {
        token: token_y,
        duration: 187.5,
    }));
    assert!(session.handle_media_event(MediaEvent::TimeUpdate {
        token: token_y,
        position: 12.0,
    }));
    assert_eq!(session.duration(), 187.5);
    assert_eq!(session.current_time(), 12.0);
}

#[test]
fn test_track_end_auto_advances() {
    let mut session = session_with(PlaybackConfig::default());
    let tracks = abc();

    session
        .play_track(tracks[0].clone(), PlayOptions::from_queue(tracks, 0))
        .unwrap();
    session.drain_events();

    let token = session.load_token();
    assert!(session.handle_media_event(MediaEvent::Ended { token }));

    assert_eq!(current_id(&session), Some("b"));
    assert!(session.is_playing());

    let events = session.drain_events();
    assert!(events.contains(&PlaybackEvent::TrackFinished {
        track_id: TrackId::new("a")
    }));
    assert!(events.contains(&PlaybackEvent::TrackChanged {
        track_id: TrackId::new("b"),
        previous_track_id: Some(TrackId::new("a")),
    }));
}

#[test]
fn test_track_end_stop_policy() {
    let mut session = session_with(PlaybackConfig {
        track_end: TrackEndPolicy::Stop,
        ..Default::default()
    });
    let tracks = abc();

    session
        .play_track(tracks[0].clone(), PlayOptions::from_queue(tracks, 0))
        .unwrap();
    let token = session.load_token();
    session.handle_media_event(MediaEvent::Ended { token });

    assert_eq!(current_id(&session), Some("a"));
    assert_eq!(session.state(), PlaybackState::Ended);
    assert_eq!(session.current_time(), session.duration());

    // Play after the end starts over
    session.play();
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(session.current_time(), 0.0);
    assert_eq!(session.output().last(), Some(&Command::Play));
}

#[test]
fn test_end_of_queue_without_fallback_stays_ended() {
    let mut session = session_with(PlaybackConfig::default());
    session.play_track(song("a"), PlayOptions::default()).unwrap();

    let token = session.load_token();
    session.handle_media_event(MediaEvent::Ended { token });

    assert_eq!(session.state(), PlaybackState::Ended);
    assert!(!session.is_playing());
    assert_eq!(current_id(&session), Some("a"));
}

#[test]
fn test_fallback_after_last_track() {
    init_tracing();
    let mut unplayable = song("broken");
    unplayable.media_url = None;

    let fallback = ListFallback::new(vec![unplayable, song("random")]);
    let mut session =
        Session::new(PlaybackConfig::default(), RecordingOutput::default()).with_fallback(fallback);

    session.play_track(song("a"), PlayOptions::default()).unwrap();
    let token = session.load_token();
    session.handle_media_event(MediaEvent::Ended { token });

    assert_eq!(current_id(&session), Some("random"));
    assert!(session.is_playing());
    assert_eq!(session.queue().len(), 1);
    assert_eq!(session.output().loads(), vec![url("a"), url("random")]);
}

#[test]
fn test_fallback_gives_up_after_max_attempts() {
    init_tracing();
    let mut calls = 0;
    let fallback = move || {
        calls += 1;
        let mut track = song(&format!("dud{calls}"));
        track.media_url = Some("no".to_string());
        Some(track)
    };
    let config = PlaybackConfig {
        max_fallback_attempts: 3,
        ..Default::default()
    };
    let mut session = Session::new(config, RecordingOutput::default()).with_fallback(fallback);

    session.play_track(song("a"), PlayOptions::default()).unwrap();
    let token = session.load_token();
    session.handle_media_event(MediaEvent::Ended { token });

    assert_eq!(current_id(&session), Some("a"));
    assert_eq!(session.state(), PlaybackState::Ended);
}

#[test]
fn test_time_updates_do_not_pile_up() {
    let mut session = session_with(PlaybackConfig::default());
    session.play_track(song("a"), PlayOptions::default()).unwrap();
    session.drain_events();

    let token = session.load_token();
    for tick in 0..2000 {
        session.handle_media_event(MediaEvent::TimeUpdate {
            token,
            position: f64::from(tick) * 0.05,
        });
    }

    let events = session.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        PlaybackEvent::PositionUpdate { position, .. } if (position - 99.95).abs() < 1e-9
    ));
}

// ===== Failures =====

#[test]
fn test_unplayable_request_is_rejected() {
    let mut session = session_with(PlaybackConfig::default());
    let mut track = song("a");
    track.media_url = Some("   ".to_string());

    let err = session.play_track(track, PlayOptions::default()).unwrap_err();
    assert!(matches!(err, PlaybackError::Unplayable(_)));

    assert_eq!(session.state(), PlaybackState::Empty);
    assert!(session.queue().is_empty());
    assert!(session.output().loads().is_empty());
}

#[test]
fn test_load_failure_keeps_track_paused() {
    init_tracing();
    let mut session = Session::new(
        PlaybackConfig::default(),
        RecordingOutput::with_broken(&url("b")),
    );
    let tracks = abc();

    session
        .play_track(tracks[0].clone(), PlayOptions::from_queue(tracks, 0))
        .unwrap();
    session.drain_events();

    // Navigation still moves; the failure is reported as an event
    assert!(session.play_next());
    assert_eq!(current_id(&session), Some("b"));
    assert!(!session.is_playing());

    let events = session.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::LoadFailed { track_id, .. } if track_id.as_str() == "b"
    )));

    // The session stays usable
    assert!(session.play_next());
    assert_eq!(current_id(&session), Some("c"));
    assert!(session.is_playing());
}

#[test]
fn test_direct_load_failure_returns_error() {
    init_tracing();
    let mut session = Session::new(
        PlaybackConfig::default(),
        RecordingOutput::with_broken(&url("a")),
    );

    let err = session.play_track(song("a"), PlayOptions::default()).unwrap_err();
    assert!(matches!(err, PlaybackError::LoadFailed { .. }));
    assert_eq!(current_id(&session), Some("a"));
    assert_eq!(session.state(), PlaybackState::Paused);
}

#[test]
fn test_failed_event_then_play_reloads() {
    let mut session = session_with(PlaybackConfig::default());
    session.play_track(song("a"), PlayOptions::default()).unwrap();

    let first = session.load_token();
    assert!(session.handle_media_event(MediaEvent::Failed {
        token: first,
        reason: "network error".to_string(),
    }));
    assert!(!session.is_playing());

    session.play();
    assert!(session.is_playing());
    assert_ne!(session.load_token(), first);
    assert_eq!(session.output().loads(), vec![url("a"), url("a")]);
}

#[test]
fn test_refused_play_is_reported() {
    init_tracing();
    let output = RecordingOutput {
        refuse_play: true,
        ..Default::default()
    };
    let mut session = Session::new(PlaybackConfig::default(), output);

    let err = session.play_track(song("a"), PlayOptions::default()).unwrap_err();
    assert!(err.to_string().contains("autoplay blocked"));
    assert!(!session.is_playing());
}

#[test]
fn test_unplayable_track_inside_queue() {
    let mut session = session_with(PlaybackConfig::default());
    let mut tracks = abc();
    tracks[1].media_url = Some("no".to_string());

    session
        .play_track(tracks[0].clone(), PlayOptions::from_queue(tracks, 0))
        .unwrap();
    session.drain_events();

    assert!(session.play_next());
    assert_eq!(current_id(&session), Some("b"));
    assert_eq!(session.state(), PlaybackState::Paused);
    assert!(session.drain_events().contains(&PlaybackEvent::Unplayable {
        track_id: TrackId::new("b")
    }));

    assert!(session.play_next());
    assert_eq!(current_id(&session), Some("c"));
    assert!(session.is_playing());
}

// ===== Lifecycle =====

#[test]
fn test_event_order_for_play_track() {
    let mut session = session_with(PlaybackConfig::default());
    session.play_track(song("a"), PlayOptions::default()).unwrap();

    let events = session.drain_events();
    assert_eq!(
        events,
        vec![
            PlaybackEvent::QueueChanged {
                length: 1,
                cursor: Some(0)
            },
            PlaybackEvent::TrackChanged {
                track_id: TrackId::new("a"),
                previous_track_id: None,
            },
            PlaybackEvent::PositionUpdate {
                position: 0.0,
                duration: 200.0
            },
            PlaybackEvent::StateChanged {
                state: PlaybackState::Playing
            },
        ]
    );
    assert!(!session.has_pending_events());
}

#[test]
fn test_shutdown_returns_paused_output() {
    let mut session = session_with(PlaybackConfig::default());
    session.play_track(song("a"), PlayOptions::default()).unwrap();

    let output = session.shutdown();
    assert_eq!(output.last(), Some(&Command::Pause));
}
