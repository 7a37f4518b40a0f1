//! Catalog (backend) song shape and its mapping to player tracks
use crate::error::{CoreError, Result};
use crate::types::{Track, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Length of the catalog's streamable previews
///
/// The catalog does not report durations, so every mapped track starts with
/// this value until the audio output reports the real one.
pub const PREVIEW_DURATION: Duration = Duration::from_secs(30);

/// Song as returned by the catalog search endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSong {
    /// Numeric catalog id
    pub id: u64,
    /// Song title
    pub title: String,
    /// Artist name
    pub artist: String,
    /// Cover image, null or blank when the catalog has none
    pub album_art_url: Option<String>,
    /// Streamable media, `"no"` for songs without a preview
    pub song_url: String,
    /// When the song was added to the catalog
    pub created_at: DateTime<Utc>,
}

/// One hit of a song search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSearchItem {
    /// The matching song
    pub song: CatalogSong,
    /// Search score, when the endpoint ranks results
    pub relevance: Option<f64>,
}

/// Response body of the song search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSearchResponse {
    /// Query as the catalog understood it
    pub query: String,
    /// Hits, best first
    pub songs: Vec<CatalogSearchItem>,
    /// Total number of matches
    pub total: usize,
}

impl CatalogSearchResponse {
    /// Parse a raw response body
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Tracks in relevance order as returned by the catalog
    pub fn into_tracks(self) -> Vec<Track> {
        self.songs.into_iter().map(|item| item.song.into()).collect()
    }
}

impl From<CatalogSong> for Track {
    fn from(song: CatalogSong) -> Self {
        Self {
            id: TrackId::from(song.id),
            title: song.title,
            artist: song.artist,
            album: String::new(),
            artwork_url: song.album_art_url.filter(|url| !url.trim().is_empty()),
            media_url: Some(song.song_url),
            duration: PREVIEW_DURATION,
        }
    }
}

impl TryFrom<&serde_json::Value> for CatalogSong {
    type Error = CoreError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| CoreError::invalid_input(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "query": "blue",
        "songs": [
            {
                "song": {
                    "id": 12,
                    "title": "Blue Monday",
                    "artist": "New Order",
                    "album_art_url": null,
                    "song_url": "https://cdn.example/12.mp3",
                    "created_at": "2024-03-01T10:00:00Z"
                },
                "relevance": 0.92
            },
            {
                "song": {
                    "id": 13,
                    "title": "Blue",
                    "artist": "Joni Mitchell",
                    "album_art_url": "https://img.example/13.jpg",
                    "song_url": "no",
                    "created_at": "2024-03-02T10:00:00Z"
                },
                "relevance": null
            }
        ],
        "total": 2
    }"#;

    #[test]
    fn search_response_maps_to_tracks() {
        let response = CatalogSearchResponse::from_json(SEARCH_BODY).unwrap();
        assert_eq!(response.total, 2);

        let tracks = response.into_tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id.as_str(), "12");
        assert_eq!(tracks[0].duration, PREVIEW_DURATION);
        assert!(tracks[0].artwork_url.is_none());
        assert!(tracks[0].is_playable());

        assert_eq!(tracks[1].artwork_url.as_deref(), Some("https://img.example/13.jpg"));
        assert!(!tracks[1].is_playable());
    }

    #[test]
    fn malformed_body_is_a_serialization_error() {
        let err = CatalogSearchResponse::from_json("{\"query\": 3}").unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn single_song_from_json_value() {
        let value = serde_json::json!({
            "id": 5,
            "title": "Five",
            "artist": "Band",
            "album_art_url": "   ",
            "song_url": "https://cdn.example/5.mp3",
            "created_at": "2024-01-01T00:00:00Z"
        });

        let track: Track = CatalogSong::try_from(&value).unwrap().into();
        assert_eq!(track.id, TrackId::new("5"));
        assert!(track.artwork_url.is_none());
    }

    #[test]
    fn missing_field_is_invalid_input() {
        let value = serde_json::json!({ "id": 5 });
        let err = CatalogSong::try_from(&value).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}
