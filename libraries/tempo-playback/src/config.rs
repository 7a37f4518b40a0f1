//! Playback configuration
//!
//! Defaults match the web player. Values can be overridden from a TOML file
//! and from `TEMPO_PLAYBACK_*` environment variables.

use crate::error::{PlaybackError, Result};
use crate::types::{QueueEndPolicy, TrackEndPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "TEMPO_PLAYBACK";

/// Configuration for a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 0.7)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Edge behavior of next/previous (default: Clamp)
    #[serde(default)]
    pub queue_end: QueueEndPolicy,

    /// Behavior when a track finishes (default: AutoAdvance)
    #[serde(default)]
    pub track_end: TrackEndPolicy,

    /// Requesting the loaded track again toggles play/pause (default: false)
    #[serde(default)]
    pub same_track_toggles: bool,

    /// "Previous" restarts the current track once past this position
    /// (default: unset, always move back)
    #[serde(default)]
    pub restart_threshold_secs: Option<f64>,

    /// Candidates requested from the fallback source before giving up (default: 5)
    #[serde(default = "default_max_fallback_attempts")]
    pub max_fallback_attempts: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            queue_end: QueueEndPolicy::default(),
            track_end: TrackEndPolicy::default(),
            same_track_toggles: false,
            restart_threshold_secs: None,
            max_fallback_attempts: default_max_fallback_attempts(),
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load configuration, reading overrides from `env` instead of the
    /// process environment when given
    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::Config(format!(
                "volume must be between 0.0 and 1.0, got {}",
                self.volume
            )));
        }

        if let Some(threshold) = self.restart_threshold_secs {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(PlaybackError::Config(format!(
                    "restart_threshold_secs must be a non-negative number, got {threshold}"
                )));
            }
        }

        Ok(())
    }
}

fn default_volume() -> f32 {
    0.7
}

fn default_max_fallback_attempts() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.volume, 0.7);
        assert_eq!(config.queue_end, QueueEndPolicy::Clamp);
        assert_eq!(config.track_end, TrackEndPolicy::AutoAdvance);
        assert!(!config.same_track_toggles);
        assert!(config.restart_threshold_secs.is_none());
        assert_eq!(config.max_fallback_attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "volume = 0.5\nqueue_end = \"wrap\"\ntrack_end = \"stop\"\nrestart_threshold_secs = 3.0"
        )
        .unwrap();

        let config = PlaybackConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.volume, 0.5);
        assert_eq!(config.queue_end, QueueEndPolicy::Wrap);
        assert_eq!(config.track_end, TrackEndPolicy::Stop);
        assert_eq!(config.restart_threshold_secs, Some(3.0));
        // Untouched keys keep their defaults
        assert_eq!(config.max_fallback_attempts, 5);
    }

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn load_from_environment() {
        let vars = env(&[
            ("TEMPO_PLAYBACK_QUEUE_END", "wrap"),
            ("TEMPO_PLAYBACK_VOLUME", "0.4"),
            ("UNRELATED_VOLUME", "0.9"),
        ]);

        let config = PlaybackConfig::load_with_env(None, vars).unwrap();
        assert_eq!(config.queue_end, QueueEndPolicy::Wrap);
        assert!((config.volume - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.track_end, TrackEndPolicy::AutoAdvance);
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "volume = 0.5\nmax_fallback_attempts = 2").unwrap();

        let vars = env(&[("TEMPO_PLAYBACK_VOLUME", "0.9")]);
        let config = PlaybackConfig::load_with_env(Some(file.path()), vars).unwrap();

        assert!((config.volume - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.max_fallback_attempts, 2);
    }

    #[test]
    fn invalid_environment_value_rejected() {
        let vars = env(&[("TEMPO_PLAYBACK_VOLUME", "3")]);
        let err = PlaybackConfig::load_with_env(None, vars).unwrap_err();
        assert!(matches!(err, PlaybackError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = PlaybackConfig::load(Some(Path::new("/nonexistent/tempo.toml"))).unwrap_err();
        assert!(matches!(err, PlaybackError::Config(_)));
    }

    #[test]
    fn out_of_range_volume_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "volume = 1.5").unwrap();

        let err = PlaybackConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("volume"));
    }

    #[test]
    fn negative_restart_threshold_rejected() {
        let config = PlaybackConfig {
            restart_threshold_secs: Some(-1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
