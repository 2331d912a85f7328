//! Spotify Web API integration
//!
//! Track search, album lookup (with paged track listings) and audio
//! features, authenticated with the client-credentials flow.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;

pub use client::SpotifyClient;
