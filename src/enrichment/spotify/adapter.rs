//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.

use super::dto;
use crate::enrichment::domain::{
    AlbumRef, AudioFeatures, CatalogAlbum, CatalogTrack, PagedTrack, TrackPage,
};

/// Convert a search response into the tracks it found (possibly none)
pub fn to_tracks(response: dto::SearchResponse) -> Vec<CatalogTrack> {
    response
        .tracks
        .map(|page| page.items.into_iter().map(to_track).collect())
        .unwrap_or_default()
}

pub fn to_track(track: dto::Track) -> CatalogTrack {
    CatalogTrack {
        id: track.id,
        name: track.name,
        artists: artist_names(track.artists),
        track_number: track.track_number,
        disc_number: track.disc_number,
        album: AlbumRef {
            id: track.album.id,
            name: track.album.name,
            images: image_urls(track.album.images),
        },
    }
}

pub fn to_album(album: dto::Album) -> CatalogAlbum {
    CatalogAlbum {
        id: album.id,
        name: album.name,
        artists: artist_names(album.artists),
        release_date: album.release_date.filter(|d| !d.is_empty()),
        genres: album.genres,
        label: album.label.filter(|l| !l.is_empty()),
        images: image_urls(album.images),
        tracks: to_page(album.tracks),
    }
}

pub fn to_page(page: dto::Paging<dto::SimplifiedTrack>) -> TrackPage {
    TrackPage {
        items: page
            .items
            .into_iter()
            .map(|t| PagedTrack {
                disc_number: t.disc_number,
            })
            .collect(),
        next: page.next,
    }
}

pub fn to_features(features: dto::AudioFeatures) -> AudioFeatures {
    AudioFeatures {
        tempo: features.tempo,
        key: features.key,
    }
}

fn artist_names(artists: Vec<dto::SimplifiedArtist>) -> Vec<String> {
    artists.into_iter().map(|a| a.name).collect()
}

fn image_urls(images: Vec<dto::Image>) -> Vec<String> {
    images.into_iter().map(|i| i.url).collect()
}
