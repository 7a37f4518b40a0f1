//! Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Media reference the catalog uses for songs it cannot stream
const UNPLAYABLE_SENTINEL: &str = "no";

/// Playable song as the player sees it
///
/// Field names on the wire follow the web client (`coverArt`, `url`,
/// `duration` in seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name (empty when the catalog has none)
    #[serde(default)]
    pub album: String,

    /// Artwork shown in the player bar
    #[serde(default, rename = "coverArt")]
    pub artwork_url: Option<String>,

    /// Media reference handed to the audio output
    #[serde(default, rename = "url")]
    pub media_url: Option<String>,

    /// Nominal duration, replaced by the real one once the media is decoded
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl Track {
    /// Create a track with a media reference and no album or artwork
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        media_url: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: String::new(),
            artwork_url: None,
            media_url: Some(media_url.into()),
            duration,
        }
    }

    /// Set the album name
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Set the artwork reference
    #[must_use]
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Media reference if the track can actually be streamed
    pub fn playable_url(&self) -> Option<&str> {
        self.media_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != UNPLAYABLE_SENTINEL)
    }

    /// Whether the output can be asked to load this track
    pub fn is_playable(&self) -> bool {
        self.playable_url().is_some()
    }
}

/// Serde helper storing a `Duration` as fractional seconds
pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if secs.is_finite() && secs >= 0.0 {
            Ok(Duration::from_secs_f64(secs))
        } else {
            Err(serde::de::Error::custom(format!(
                "duration must be a non-negative number of seconds, got {secs}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_with_url(url: Option<&str>) -> Track {
        Track {
            id: TrackId::new("1"),
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            album: String::new(),
            artwork_url: None,
            media_url: url.map(String::from),
            duration: Duration::from_secs(30),
        }
    }

    #[test]
    fn playable_requires_real_media_url() {
        assert!(track_with_url(Some("https://cdn.example/1.mp3")).is_playable());
        assert!(!track_with_url(None).is_playable());
        assert!(!track_with_url(Some("")).is_playable());
        assert!(!track_with_url(Some("   ")).is_playable());
        assert!(!track_with_url(Some("no")).is_playable());
    }

    #[test]
    fn deserializes_web_client_shape() {
        let json = r#"{
            "id": "42",
            "title": "Blue",
            "artist": "Someone",
            "album": "Colours",
            "duration": 187.5,
            "coverArt": "https://img.example/42.jpg",
            "url": "https://cdn.example/42.mp3"
        }"#;

        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, TrackId::new("42"));
        assert_eq!(track.album, "Colours");
        assert_eq!(track.duration, Duration::from_millis(187_500));
        assert_eq!(track.artwork_url.as_deref(), Some("https://img.example/42.jpg"));
        assert_eq!(track.playable_url(), Some("https://cdn.example/42.mp3"));
    }

    #[test]
    fn rejects_negative_duration() {
        let json = r#"{"id":"1","title":"t","artist":"a","duration":-3}"#;
        assert!(serde_json::from_str::<Track>(json).is_err());
    }

    #[test]
    fn serializes_duration_as_seconds() {
        let track = Track::new("7", "Seven", "Band", "https://cdn.example/7.mp3", Duration::from_secs(90));
        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(value["duration"], 90.0);
        assert_eq!(value["url"], "https://cdn.example/7.mp3");
    }
}
