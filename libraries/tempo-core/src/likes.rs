//! Liked tracks
//!
//! Likes are a relation between users and tracks, kept in both directions so
//! that "my liked songs" and "how many people like this" are both cheap.

use crate::types::{TrackId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A track a user has liked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedTrack {
    /// The liked track
    pub track_id: TrackId,
    /// When the like was recorded
    pub liked_at: DateTime<Utc>,
}

/// User x track like relation
#[derive(Debug, Clone, Default)]
pub struct LikeRegistry {
    /// Likes per user, oldest first
    by_user: HashMap<UserId, Vec<LikedTrack>>,

    /// Users per track
    by_track: HashMap<TrackId, HashSet<UserId>>,
}

impl LikeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a like now
    ///
    /// Returns false if the user already liked the track.
    pub fn like(&mut self, user: &UserId, track: &TrackId) -> bool {
        self.like_at(user, track, Utc::now())
    }

    /// Record a like with an explicit timestamp
    pub fn like_at(&mut self, user: &UserId, track: &TrackId, at: DateTime<Utc>) -> bool {
        let likers = self.by_track.entry(track.clone()).or_default();
        if !likers.insert(user.clone()) {
            return false;
        }

        self.by_user.entry(user.clone()).or_default().push(LikedTrack {
            track_id: track.clone(),
            liked_at: at,
        });
        debug!(user = %user, track = %track, "track liked");
        true
    }

    /// Remove a like
    ///
    /// Returns false if there was nothing to remove.
    pub fn unlike(&mut self, user: &UserId, track: &TrackId) -> bool {
        let removed = self
            .by_track
            .get_mut(track)
            .is_some_and(|likers| likers.remove(user));
        if !removed {
            return false;
        }

        if self.by_track.get(track).is_some_and(HashSet::is_empty) {
            self.by_track.remove(track);
        }
        if let Some(liked) = self.by_user.get_mut(user) {
            liked.retain(|entry| &entry.track_id != track);
            if liked.is_empty() {
                self.by_user.remove(user);
            }
        }
        debug!(user = %user, track = %track, "track unliked");
        true
    }

    /// Flip the like state, returning whether the track is now liked
    pub fn toggle(&mut self, user: &UserId, track: &TrackId) -> bool {
        if self.is_liked(user, track) {
            self.unlike(user, track);
            false
        } else {
            self.like(user, track)
        }
    }

    /// Check whether a user likes a track
    pub fn is_liked(&self, user: &UserId, track: &TrackId) -> bool {
        self.by_track
            .get(track)
            .is_some_and(|likers| likers.contains(user))
    }

    /// A user's liked tracks, most recent first
    pub fn liked_tracks(&self, user: &UserId) -> Vec<&LikedTrack> {
        self.by_user
            .get(user)
            .map(|liked| liked.iter().rev().collect())
            .unwrap_or_default()
    }

    /// Ids of the tracks a user likes, for quick membership checks in lists
    pub fn liked_ids(&self, user: &UserId) -> HashSet<&TrackId> {
        self.by_user
            .get(user)
            .map(|liked| liked.iter().map(|entry| &entry.track_id).collect())
            .unwrap_or_default()
    }

    /// Number of users liking a track
    pub fn like_count(&self, track: &TrackId) -> usize {
        self.by_track.get(track).map_or(0, HashSet::len)
    }
}
