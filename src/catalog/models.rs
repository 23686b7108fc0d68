use serde::{Deserialize, Serialize};

/// A single music track as returned by the catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub collection: Option<String>,
    pub artwork_url: Option<String>,
    pub duration_ms: Option<u64>,
    pub preview_url: Option<String>,
    pub view_url: Option<String>,
}

impl Track {
    /// Duration in whole minutes, rounded half up.
    pub fn duration_minutes(&self) -> Option<u64> {
        self.duration_ms
            .map(|ms| ms / 60_000 + u64::from(ms % 60_000 >= 30_000))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown track")
    }

    pub fn display_artist(&self) -> &str {
        self.artist.as_deref().unwrap_or("Unknown artist")
    }

    pub fn display_collection(&self) -> &str {
        self.collection.as_deref().unwrap_or("Unknown album")
    }
}

/// Parameters sent with every catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub media: String,
    pub limit: u32,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, media: impl Into<String>, limit: u32) -> Self {
        Self {
            term: term.into(),
            media: media.into(),
            limit,
        }
    }

    pub fn as_params(&self) -> [(&'static str, String); 3] {
        [
            ("term", self.term.clone()),
            ("media", self.media.clone()),
            ("limit", self.limit.to_string()),
        ]
    }
}

#[cfg(test)]
impl Track {
    pub fn mock(id: u64, name: &str, artist: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            artist: Some(artist.to_string()),
            collection: Some("Mock Album".to_string()),
            artwork_url: Some("https://example.com/100x100bb.jpg".to_string()),
            duration_ms: Some(180_000),
            preview_url: None,
            view_url: None,
        }
    }
}
