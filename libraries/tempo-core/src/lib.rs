//! Tempo Core
//!
//! Platform-agnostic domain types shared by the Tempo player crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `UserId`
//! - **Catalog mapping**: backend song JSON (`CatalogSong`) to `Track`
//! - **Likes**: `LikeRegistry`, the user x track relation
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use tempo_core::{LikeRegistry, Track, TrackId, UserId};
//! use std::time::Duration;
//!
//! let track = Track::new("42", "Blue", "Someone", "https://cdn.example/42.mp3", Duration::from_secs(30));
//! assert!(track.is_playable());
//!
//! let mut likes = LikeRegistry::new();
//! let user = UserId::new("alice");
//! likes.like(&user, &track.id);
//! assert!(likes.is_liked(&user, &TrackId::new("42")));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod likes;
pub mod types;

pub use error::{CoreError, Result};
pub use likes::{LikeRegistry, LikedTrack};
pub use types::{
    CatalogSearchItem, CatalogSearchResponse, CatalogSong, Track, TrackId, UserId,
    PREVIEW_DURATION,
};
