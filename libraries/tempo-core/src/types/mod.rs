//! Domain types

mod catalog;
mod ids;
mod track;

pub use catalog::{CatalogSearchItem, CatalogSearchResponse, CatalogSong, PREVIEW_DURATION};
pub use ids::{TrackId, UserId};
pub use track::Track;
