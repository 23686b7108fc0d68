use std::collections::HashMap;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::catalog::Track;
use crate::favorites::models::{FavoriteEntry, Toggled};

/// In-memory favourites keyed by track id.
///
/// Entries are unique per id and iterate in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct FavoritesStore {
    entries: HashMap<u64, FavoriteEntry>,
    order: Vec<u64>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_favorite(&self, track_id: u64) -> bool {
        self.entries.contains_key(&track_id)
    }

    pub fn get(&self, track_id: u64) -> Option<&FavoriteEntry> {
        self.entries.get(&track_id)
    }

    /// Flips the membership of `track`.
    ///
    /// Adding attaches `rating`; removing discards whatever rating the entry
    /// had.
    pub fn toggle(&mut self, track: &Track, rating: &str) -> Toggled {
        if self.remove(track.id).is_some() {
            return Toggled::Removed;
        }

        let entry = FavoriteEntry::new(track.clone(), rating);
        debug!(
            "Adding favourite {} ({}) rating={:?}",
            track.id,
            track.display_name(),
            entry.rating
        );
        self.order.push(track.id);
        self.entries.insert(track.id, entry);

        Toggled::Added
    }

    pub fn remove(&mut self, track_id: u64) -> Option<FavoriteEntry> {
        let removed = self.entries.remove(&track_id)?;
        self.order.retain(|id| *id != track_id);
        debug!("Removed favourite {}", track_id);
        Some(removed)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FavoriteEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// The entry at a 1-based position in display order.
    pub fn nth(&self, position: usize) -> Option<&FavoriteEntry> {
        position
            .checked_sub(1)
            .and_then(|idx| self.order.get(idx))
            .and_then(|id| self.entries.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for FavoritesStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
