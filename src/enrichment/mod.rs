//! Catalog lookup and tag enrichment.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`spotify/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for the catalog and cover images
//! - **Query / mapper / analysis** - Pure-ish steps over the [`CatalogApi`] seam
//! - **Service** - Per-file orchestration from lookup to saved tag
//!
//! API changes stay inside the DTOs and adapters, and everything above
//! the traits can be tested against mocks.
//!
//! # Usage
//!
//! ```ignore
//! use enrichment::{SpotifyClient, CoverArtClient, TaggingService, TagOptions};
//!
//! let service = TaggingService::new(SpotifyClient::new(creds)?, CoverArtClient::new()?, LoftyStore);
//! let report = service.process(Path::new("song.mp3"), &TagOptions::default(), &mut confirm).await?;
//! ```

pub mod analysis;
pub mod coverart;
pub mod domain;
pub mod mapper;
pub mod query;
pub mod service;
pub mod spotify;
pub mod traits;

pub use coverart::CoverArtClient;
pub use domain::{EnrichmentError, MatchRecord};
pub use service::{Confirm, FileReport, Outcome, TagOptions, TaggingService};
pub use spotify::SpotifyClient;
pub use traits::{CatalogApi, CoverArtApi};
