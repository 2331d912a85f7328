//! Spotify Web API HTTP client
//!
//! Handles communication with the Spotify Web API.
//! See: https://developer.spotify.com/documentation/web-api
//!
//! ## Authentication
//! Uses the client-credentials flow: the client ID and secret are exchanged
//! for a bearer token at accounts.spotify.com. The token is cached until
//! shortly before it expires and refreshed transparently on the next call.
//! A 401 from the API drops the cached token so the next call re-authenticates.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::config::SpotifyCredentials;
use crate::enrichment::domain::{
    AudioFeatures, CatalogAlbum, CatalogTrack, EnrichmentError, TrackPage,
};

/// Refresh tokens this long before Spotify says they expire
const TOKEN_MARGIN: Duration = Duration::from_secs(30);

/// Cached bearer token
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_MARGIN < self.expires_at
    }
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    credentials: SpotifyCredentials,
    api_url: String,
    token_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyClient {
    /// Create a new client for the given credentials
    ///
    /// No request is made until the first lookup.
    pub fn new(credentials: SpotifyCredentials) -> Result<Self, EnrichmentError> {
        Self::with_urls(
            credentials,
            "https://api.spotify.com/v1",
            "https://accounts.spotify.com/api/token",
        )
    }

    /// Create a client against custom endpoints
    pub fn with_urls(
        credentials: SpotifyCredentials,
        api_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            credentials,
            api_url: api_url.into(),
            token_url: token_url.into(),
            token: Mutex::new(None),
        })
    }

    /// Search for tracks matching a free-text term (best match only)
    pub async fn search_tracks(&self, term: &str) -> Result<Vec<CatalogTrack>, EnrichmentError> {
        let url = self.search_url(term);
        let response: dto::SearchResponse = self.get_json(&url).await?;
        Ok(adapter::to_tracks(response))
    }

    /// Fetch a full album record
    pub async fn album(&self, album_id: &str) -> Result<CatalogAlbum, EnrichmentError> {
        let url = format!("{}/albums/{}", self.api_url, album_id);
        let response: dto::Album = self.get_json(&url).await?;
        Ok(adapter::to_album(response))
    }

    /// Follow a track listing's `next` link
    pub async fn next_page(&self, url: &str) -> Result<TrackPage, EnrichmentError> {
        let response: dto::Paging<dto::SimplifiedTrack> = self.get_json(url).await?;
        Ok(adapter::to_page(response))
    }

    /// Fetch tempo/key analysis for a track
    pub async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures, EnrichmentError> {
        let url = format!("{}/audio-features/{}", self.api_url, track_id);
        let response: dto::AudioFeatures = self.get_json(&url).await?;
        Ok(adapter::to_features(response))
    }

    fn search_url(&self, term: &str) -> String {
        format!(
            "{}/search?q={}&type=track&limit=1",
            self.api_url,
            urlencoding::encode(term)
        )
    }

    /// Return a valid bearer token, requesting a new one if needed
    async fn bearer(&self) -> Result<String, EnrichmentError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh()
        {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken, EnrichmentError> {
        tracing::debug!("Requesting Spotify access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(EnrichmentError::Unauthorized(
                "client credentials were rejected".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(http_error(status));
        }

        let token = response
            .json::<dto::TokenResponse>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

        Ok(AccessToken {
            value: token.access_token,
            expires_at: token_expiry(token.expires_in)?,
        })
    }

    /// Send an authenticated GET and parse the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EnrichmentError> {
        let token = self.bearer().await?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
            return Err(EnrichmentError::Unauthorized(format!("GET {}", url)));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichmentError::NoMatches);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichmentError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(EnrichmentError::ApiError(error.error.message));
            }
            return Err(http_error(status));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

/// When a token issued now with a lifetime of `expires_in` seconds runs out
fn token_expiry(expires_in: u64) -> Result<Instant, EnrichmentError> {
    Instant::now()
        .checked_add(Duration::from_secs(expires_in))
        .ok_or_else(|| {
            EnrichmentError::InvalidResponse(format!(
                "token lifetime of {}s is out of range",
                expires_in
            ))
        })
}

fn http_error(status: reqwest::StatusCode) -> EnrichmentError {
    EnrichmentError::ApiError(format!(
        "HTTP {}: {}",
        status,
        status.canonical_reason().unwrap_or("Unknown")
    ))
}
