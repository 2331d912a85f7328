//! Tempo and key lookup.

use super::domain::{Analysis, EnrichmentError};
use super::traits::CatalogApi;

/// Pitch class names, indexed by the catalog's key number
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Name for a pitch class index; `None` for -1 (no key) or anything out of range
pub fn pitch_class(index: i32) -> Option<&'static str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| PITCH_CLASSES.get(i).copied())
}

/// Fetch tempo and key for a matched track. One request, no caching.
pub async fn fetch_analysis<C: CatalogApi + ?Sized>(
    catalog: &C,
    track_id: &str,
) -> Result<Analysis, EnrichmentError> {
    let features = catalog.audio_features(track_id).await?;
    Ok(Analysis {
        tempo: features.tempo,
        key: pitch_class(features.key),
    })
}
