use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Track;

/// A favourited track with the rating the user gave it at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub track: Track,
    pub rating: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl FavoriteEntry {
    /// Blank ratings are stored as `None`; anything else is kept verbatim.
    pub fn new(track: Track, rating: &str) -> Self {
        let rating = Some(rating.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Self {
            track,
            rating,
            added_at: Utc::now(),
        }
    }

    pub fn track_id(&self) -> u64 {
        self.track.id
    }

    /// Rating formatted for display, e.g. `(8 /10)`.
    pub fn rating_label(&self) -> Option<String> {
        self.rating.as_ref().map(|r| format!("({} /10)", r))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

impl std::fmt::Display for Toggled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Toggled::Added => write!(f, "Added to favourites"),
            Toggled::Removed => write!(f, "Removed from favourites"),
        }
    }
}
