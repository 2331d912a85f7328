//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Spotify Web API returns.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api
//!
//! Only the fields we read are declared; serde ignores the rest.

use serde::{Deserialize, Serialize};

/// Client-credentials token response from accounts.spotify.com
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// `/v1/search` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Present when `type=track` was requested
    pub tracks: Option<Paging<Track>>,
}

/// Generic paging object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Full URL of the next page
    pub next: Option<String>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

/// Full track object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub album: SimplifiedAlbum,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default = "default_disc")]
    pub disc_number: u32,
}

/// Artist as embedded in tracks and albums
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplifiedArtist {
    pub id: Option<String>,
    pub name: String,
}

/// Album as embedded in a track
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplifiedAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
}

/// Cover image reference
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// `/v1/albums/{id}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub release_date: Option<String>,
    /// "year", "month" or "day"
    pub release_date_precision: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracks: Paging<SimplifiedTrack>,
}

/// Track entry inside an album's listing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplifiedTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default = "default_disc")]
    pub disc_number: u32,
    #[serde(default)]
    pub track_number: u32,
}

/// `/v1/audio-features/{id}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioFeatures {
    pub id: String,
    pub tempo: f64,
    /// Pitch class, -1 if no key was detected
    pub key: i32,
    pub mode: Option<i32>,
}

/// Error body: `{"error": {"status": 404, "message": "..."}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
}

fn default_disc() -> u32 {
    1
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
