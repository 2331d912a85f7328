//! Cover art download
//!
//! Fetches the album image a catalog match points at.

mod client;

pub use client::CoverArtClient;
