//! Internal domain models for catalog lookups.
//!
//! These types are OUR types - they don't change when the catalog API changes.
//! All external API responses get converted into these types via adapters.

/// One track as returned by a catalog search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogTrack {
    /// Catalog track ID (needed for audio feature lookup)
    pub id: String,
    /// Track title as the catalog spells it
    pub name: String,
    /// Contributing artists, in catalog order
    pub artists: Vec<String>,
    /// Position on its disc
    pub track_number: u32,
    /// Disc this track sits on
    pub disc_number: u32,
    /// The album this track belongs to (abbreviated)
    pub album: AlbumRef,
}

/// Abbreviated album info embedded in a track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
    /// Cover image URLs, largest first
    pub images: Vec<String>,
}

/// Full album record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogAlbum {
    pub id: String,
    pub name: String,
    /// Album artists, in catalog order
    pub artists: Vec<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub release_date: Option<String>,
    pub genres: Vec<String>,
    /// Record label
    pub label: Option<String>,
    /// Cover image URLs, largest first
    pub images: Vec<String>,
    /// First page of the album's track listing
    pub tracks: TrackPage,
}

/// One page of an album's track listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackPage {
    pub items: Vec<PagedTrack>,
    /// URL of the next page, if the listing continues
    pub next: Option<String>,
}

/// Minimal track entry within a listing page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagedTrack {
    pub disc_number: u32,
}

/// Audio analysis for a track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFeatures {
    /// Estimated tempo in BPM
    pub tempo: f64,
    /// Pitch class index, -1 when no key was detected
    pub key: i32,
}

/// Downloaded cover image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    /// Image data (JPEG or PNG)
    pub data: Vec<u8>,
    /// MIME type from the response
    pub mime_type: String,
}

/// Fields derived from a match, ready to be written as tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedFields {
    pub title: String,
    pub artist: String,
    pub album_artist: String,
    pub album: String,
    pub track_number: u32,
    /// (disc number, total discs)
    pub disc: (u32, u32),
    pub release_date: String,
    pub genre: String,
    pub publisher: String,
}

/// Values from a match that need further processing before tagging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchMeta {
    /// Catalog track ID, used for audio feature lookup
    pub track_id: String,
    /// First cover image listed for the album
    pub image_url: Option<String>,
}

/// A successful lookup: tag fields plus the extra data needed to finish tagging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRecord {
    pub fields: MappedFields,
    pub meta: MatchMeta,
}

impl MatchRecord {
    /// "<artist> <title>", the form a search term takes when built from tags
    pub fn search_form(&self) -> String {
        format!("{} {}", self.fields.artist, self.fields.title)
    }
}

/// Tempo and key for a track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    pub tempo: f64,
    /// Pitch class name, `None` when the catalog reported no key
    pub key: Option<&'static str>,
}

/// Errors that can occur while talking to remote services
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No matches found")]
    NoMatches,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Authentication rejected: {0}")]
    Unauthorized(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}
