//! Trait definitions for external API clients.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.
//!
//! # Example
//!
//! ```ignore
//! use id3spot::enrichment::traits::CatalogApi;
//!
//! // In production code:
//! async fn process<T: CatalogApi>(client: &T, term: &str) {
//!     let tracks = client.search_tracks(term).await?;
//! }
//!
//! // In tests:
//! struct MockCatalog { ... }
//! impl CatalogApi for MockCatalog { ... }
//! ```

use async_trait::async_trait;

use super::domain::{AudioFeatures, CatalogAlbum, CatalogTrack, CoverArt, EnrichmentError, TrackPage};

/// Trait for the remote music catalog.
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Free-text track search; returns the best match first (or nothing).
    async fn search_tracks(&self, term: &str) -> Result<Vec<CatalogTrack>, EnrichmentError>;

    /// Look up an album by its catalog ID.
    async fn album(&self, album_id: &str) -> Result<CatalogAlbum, EnrichmentError>;

    /// Fetch the page a listing's `next` link points at.
    async fn next_page(&self, url: &str) -> Result<TrackPage, EnrichmentError>;

    /// Fetch tempo/key analysis for a track.
    async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures, EnrichmentError>;
}

/// Trait for cover image downloads.
#[async_trait]
pub trait CoverArtApi: Send + Sync {
    /// Download the image at `url`.
    async fn download(&self, url: &str) -> Result<CoverArt, EnrichmentError>;
}

// Implement traits for real clients

#[async_trait]
impl CatalogApi for super::spotify::SpotifyClient {
    async fn search_tracks(&self, term: &str) -> Result<Vec<CatalogTrack>, EnrichmentError> {
        self.search_tracks(term).await
    }

    async fn album(&self, album_id: &str) -> Result<CatalogAlbum, EnrichmentError> {
        self.album(album_id).await
    }

    async fn next_page(&self, url: &str) -> Result<TrackPage, EnrichmentError> {
        self.next_page(url).await
    }

    async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures, EnrichmentError> {
        self.audio_features(track_id).await
    }
}

#[async_trait]
impl CoverArtApi for super::coverart::CoverArtClient {
    async fn download(&self, url: &str) -> Result<CoverArt, EnrichmentError> {
        self.download(url).await
    }
}
