//! Turns a catalog match into local tag fields.

use std::sync::LazyLock;

use regex::Regex;

use super::domain::{
    CatalogAlbum, CatalogTrack, EnrichmentError, MappedFields, MatchMeta, MatchRecord, TrackPage,
};
use super::traits::CatalogApi;
use crate::metadata::TagField;

/// Separator between genres. Kept as-is for files already tagged with it.
pub const GENRE_SEPARATOR: &str = " ,";

/// Separator between artist names
pub const ARTIST_SEPARATOR: &str = "/";

/// Upper bound on listing pages followed for one album
const MAX_PAGES: usize = 200;

/// Catalogs write "Song - Someone Remix"; we want "Song (Someone Remix)"
static REMIX_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s-\s([\w.?' ]+?\sremix)$").expect("remix pattern is valid")
});

/// Rewrite a trailing " - <words> Remix" as " (<words> Remix)"
pub fn normalize_title(title: &str) -> String {
    REMIX_SUFFIX.replace(title, " (${1})").into_owned()
}

/// Search once and, on a hit, fetch the album and map everything.
///
/// Search failures of any kind count as "no match". Failures after a hit
/// (album lookup, paging) are returned as errors.
pub async fn lookup<C: CatalogApi + ?Sized>(
    catalog: &C,
    term: &str,
) -> Result<Option<MatchRecord>, EnrichmentError> {
    let tracks = match catalog.search_tracks(term).await {
        Ok(tracks) => tracks,
        Err(e) => {
            tracing::debug!("Search for {:?} failed: {}", term, e);
            return Ok(None);
        }
    };

    let Some(track) = tracks.into_iter().next() else {
        return Ok(None);
    };

    let album = catalog.album(&track.album.id).await?;
    let total_discs = last_disc_number(catalog, &album.tracks)
        .await?
        .unwrap_or(track.disc_number);

    Ok(Some(map_match(&track, &album, total_discs)))
}

/// Walk an album listing to its final page and read the last entry's disc number.
pub async fn last_disc_number<C: CatalogApi + ?Sized>(
    catalog: &C,
    first: &TrackPage,
) -> Result<Option<u32>, EnrichmentError> {
    let mut page = first.clone();
    let mut followed = 0;

    while let Some(next) = page.next.take() {
        if followed == MAX_PAGES {
            return Err(EnrichmentError::InvalidResponse(format!(
                "track listing exceeds {} pages",
                MAX_PAGES
            )));
        }
        page = catalog.next_page(&next).await?;
        followed += 1;
    }

    Ok(page.items.last().map(|t| t.disc_number))
}

/// Map a track and its album into tag fields plus lookup metadata
pub fn map_match(track: &CatalogTrack, album: &CatalogAlbum, total_discs: u32) -> MatchRecord {
    let fields = MappedFields {
        title: normalize_title(&track.name),
        artist: track.artists.join(ARTIST_SEPARATOR),
        album_artist: album.artists.join(ARTIST_SEPARATOR),
        album: track.album.name.clone(),
        track_number: track.track_number,
        disc: (track.disc_number, total_discs),
        release_date: album.release_date.clone().unwrap_or_default(),
        genre: album.genres.join(GENRE_SEPARATOR),
        publisher: album.label.clone().unwrap_or_default(),
    };

    let meta = MatchMeta {
        track_id: track.id.clone(),
        image_url: track
            .album
            .images
            .first()
            .or_else(|| album.images.first())
            .cloned(),
    };

    MatchRecord { fields, meta }
}

impl MappedFields {
    /// Expand into the tag fields to assign, in assignment order
    pub fn into_tag_fields(self) -> Vec<TagField> {
        let (disc, total) = self.disc;
        vec![
            TagField::Title(self.title),
            TagField::TrackNumber(self.track_number),
            TagField::Artist(self.artist),
            TagField::AlbumArtist(self.album_artist),
            TagField::Album(self.album),
            TagField::Disc { number: disc, total },
            TagField::ReleaseDate(self.release_date),
            TagField::Genre(self.genre),
            TagField::Publisher(self.publisher),
        ]
    }
}

/// Year component of a release date ("2020", "2020-05" or "2020-05-01")
pub fn release_year(release_date: &str) -> Option<i32> {
    release_date
        .split('-')
        .next()
        .filter(|y| y.len() == 4)
        .and_then(|y| y.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::domain::PagedTrack;
    use crate::enrichment::traits::mocks::MockCatalog;
    use crate::test_utils::{mock_album, mock_track};

    #[test]
    fn test_remix_dash_becomes_parentheses() {
        assert_eq!(normalize_title("Song - Someone Remix"), "Song (Someone Remix)");
        assert_eq!(normalize_title("Song - someone REMIX"), "Song (someone REMIX)");
    }

    #[test]
    fn test_remix_already_parenthesized_is_unchanged() {
        assert_eq!(normalize_title("Song (Someone Remix)"), "Song (Someone Remix)");
    }

    #[test]
    fn test_remix_multi_word_remixer() {
        assert_eq!(
            normalize_title("Song - Some One Remix"),
            "Song (Some One Remix)"
        );
        assert_eq!(normalize_title("A - B - C Remix"), "A - B (C Remix)");
    }

    #[test]
    fn test_non_remix_suffix_is_unchanged() {
        assert_eq!(normalize_title("Song - Live"), "Song - Live");
        assert_eq!(normalize_title("Song - Remastered 2011"), "Song - Remastered 2011");
    }

    #[test]
    fn test_genre_join_keeps_separator() {
        let album = CatalogAlbum {
            genres: vec!["Pop".to_string(), "Rock".to_string()],
            ..mock_album()
        };
        let record = map_match(&mock_track(), &album, 1);
        assert_eq!(record.fields.genre, "Pop ,Rock");
    }

    #[test]
    fn test_artists_joined_in_order() {
        let track = CatalogTrack {
            artists: vec!["B".to_string(), "A".to_string()],
            ..mock_track()
        };
        let album = CatalogAlbum {
            artists: vec!["Various Artists".to_string()],
            ..mock_album()
        };
        let record = map_match(&track, &album, 1);
        assert_eq!(record.fields.artist, "B/A");
        assert_eq!(record.fields.album_artist, "Various Artists");
    }

    #[test]
    fn test_meta_uses_first_image() {
        let record = map_match(&mock_track(), &mock_album(), 1);
        assert_eq!(record.meta.track_id, "track-1");
        assert_eq!(
            record.meta.image_url.as_deref(),
            Some("https://i.example.com/large.jpg")
        );
    }

    #[test]
    fn test_release_year() {
        assert_eq!(release_year("2020-05-01"), Some(2020));
        assert_eq!(release_year("1999-12"), Some(1999));
        assert_eq!(release_year("1987"), Some(1987));
        assert_eq!(release_year(""), None);
        assert_eq!(release_year("0000x"), None);
    }

    #[tokio::test]
    async fn test_total_discs_follows_pagination() {
        let mut album = mock_album();
        album.tracks = TrackPage {
            items: vec![
                PagedTrack { disc_number: 1 },
                PagedTrack { disc_number: 1 },
            ],
            next: Some("https://api/page2".to_string()),
        };
        let page2 = TrackPage {
            items: vec![
                PagedTrack { disc_number: 2 },
                PagedTrack { disc_number: 3 },
            ],
            next: None,
        };
        let catalog = MockCatalog::single_match("Artist Title", mock_track(), album)
            .with_page("https://api/page2", page2);

        let record = lookup(&catalog, "Artist Title").await.unwrap().unwrap();

        assert_eq!(record.fields.disc, (1, 3));
        assert_eq!(catalog.page_requests(), vec!["https://api/page2"]);
    }

    #[tokio::test]
    async fn test_search_error_is_no_match() {
        let catalog = MockCatalog::with_error(EnrichmentError::Network("down".to_string()));
        let result = lookup(&catalog, "anything").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_album_failure_after_hit_is_error() {
        let mut catalog = MockCatalog::single_match("Artist Title", mock_track(), mock_album());
        catalog.albums.clear();
        let result = lookup(&catalog, "Artist Title").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_into_tag_fields_covers_every_mapped_field() {
        let record = map_match(&mock_track(), &mock_album(), 2);
        let fields = record.fields.into_tag_fields();
        assert_eq!(fields.len(), 9);
        assert!(fields.contains(&TagField::Disc { number: 1, total: 2 }));
    }
}
