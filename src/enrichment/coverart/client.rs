//! Cover image HTTP client
//!
//! Downloads album artwork from the image URLs the catalog hands out.
//! The image CDN needs no authentication.

use crate::enrichment::domain::{CoverArt, EnrichmentError};

/// Used when the server sends no usable Content-Type
const DEFAULT_MIME: &str = "image/jpeg";

/// Cover image download client
pub struct CoverArtClient {
    http_client: reqwest::Client,
}

impl CoverArtClient {
    /// Create a new client
    pub fn new() -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Download an image from a URL
    ///
    /// Any non-2xx status is an error; callers decide whether that matters.
    pub async fn download(&self, url: &str) -> Result<CoverArt, EnrichmentError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichmentError::NoMatches);
        }

        if !status.is_success() {
            return Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let mime_type = mime_from_header(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        let data = response
            .bytes()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?
            .to_vec();

        Ok(CoverArt {
            data,
            mime_type,
        })
    }
}

/// Strip parameters (`image/jpeg; charset=...`) and fall back to JPEG
fn mime_from_header(header: Option<&str>) -> String {
    header
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_MIME)
        .to_string()
}
