//! In-memory tag state for one file.
//!
//! [`TagField`] enumerates every field the tagger writes, with its type;
//! [`TagRecord::set`] is the single place a field lands on the record.

/// Embedded image bytes plus MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// The file's tag fields we read, write and display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub disc_total: Option<u32>,
    /// Full release date as the catalog gives it
    pub release_date: Option<String>,
    /// Release year, stored separately from the date
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub bpm: Option<u32>,
    /// Musical key, e.g. "F#"
    pub key: Option<String>,
    pub front_cover: Option<CoverImage>,
    /// Replace the file's tag on save instead of merging into it
    pub fresh: bool,
}

/// One assignable field with its value
#[derive(Debug, Clone, PartialEq)]
pub enum TagField {
    Title(String),
    Artist(String),
    AlbumArtist(String),
    Album(String),
    TrackNumber(u32),
    Disc { number: u32, total: u32 },
    ReleaseDate(String),
    Year(i32),
    Genre(String),
    Publisher(String),
    Bpm(u32),
    Key(String),
    FrontCover(CoverImage),
}

impl TagField {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Artist(_) => "artist",
            Self::AlbumArtist(_) => "album artist",
            Self::Album(_) => "album",
            Self::TrackNumber(_) => "track",
            Self::Disc { .. } => "disc",
            Self::ReleaseDate(_) => "release date",
            Self::Year(_) => "year",
            Self::Genre(_) => "genre",
            Self::Publisher(_) => "publisher",
            Self::Bpm(_) => "bpm",
            Self::Key(_) => "key",
            Self::FrontCover(_) => "front cover",
        }
    }

    /// Empty text, zero numbers and empty images carry no information
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Title(v)
            | Self::Artist(v)
            | Self::AlbumArtist(v)
            | Self::Album(v)
            | Self::ReleaseDate(v)
            | Self::Genre(v)
            | Self::Publisher(v)
            | Self::Key(v) => v.is_empty(),
            Self::TrackNumber(n) | Self::Bpm(n) => *n == 0,
            Self::Year(y) => *y == 0,
            // A disc pair is always written, even (0, 0)
            Self::Disc { .. } => false,
            Self::FrontCover(image) => image.data.is_empty(),
        }
    }
}

impl TagRecord {
    /// An empty record that will replace the file's tag when saved
    pub fn fresh() -> Self {
        Self {
            fresh: true,
            ..Self::default()
        }
    }

    /// Assign one field
    pub fn set(&mut self, field: TagField) {
        match field {
            TagField::Title(v) => self.title = Some(v),
            TagField::Artist(v) => self.artist = Some(v),
            TagField::AlbumArtist(v) => self.album_artist = Some(v),
            TagField::Album(v) => self.album = Some(v),
            TagField::TrackNumber(n) => self.track_number = Some(n),
            TagField::Disc { number, total } => {
                self.disc_number = Some(number);
                self.disc_total = Some(total);
            }
            TagField::ReleaseDate(v) => self.release_date = Some(v),
            TagField::Year(y) => self.year = Some(y),
            TagField::Genre(v) => self.genre = Some(v),
            TagField::Publisher(v) => self.publisher = Some(v),
            TagField::Bpm(n) => self.bpm = Some(n),
            TagField::Key(v) => self.key = Some(v),
            TagField::FrontCover(image) => self.front_cover = Some(image),
        }
    }

    /// Assign every non-empty field; returns how many were assigned
    pub fn apply(&mut self, fields: impl IntoIterator<Item = TagField>) -> usize {
        let mut assigned = 0;
        for field in fields {
            if field.is_empty() {
                tracing::debug!("Skipping empty {}", field.name());
                continue;
            }
            self.set(field);
            assigned += 1;
        }
        assigned
    }

    /// `(label, value)` for every populated field, in display order
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut text = |label: &'static str, value: &Option<String>| {
            if let Some(v) = value {
                out.push((label, v.clone()));
            }
        };
        text("title", &self.title);
        text("artist", &self.artist);
        text("album", &self.album);
        text("album artist", &self.album_artist);

        if let Some(n) = self.track_number {
            out.push(("track", n.to_string()));
        }
        match (self.disc_number, self.disc_total) {
            (Some(n), Some(t)) => out.push(("disc", format!("{}/{}", n, t))),
            (Some(n), None) => out.push(("disc", n.to_string())),
            _ => {}
        }
        if let Some(date) = &self.release_date {
            out.push(("release date", date.clone()));
        }
        if let Some(year) = self.year {
            out.push(("year", year.to_string()));
        }
        if let Some(genre) = &self.genre {
            out.push(("genre", genre.clone()));
        }
        if let Some(publisher) = &self.publisher {
            out.push(("publisher", publisher.clone()));
        }
        if let Some(bpm) = self.bpm {
            out.push(("bpm", bpm.to_string()));
        }
        if let Some(key) = &self.key {
            out.push(("key", key.clone()));
        }
        if let Some(cover) = &self.front_cover {
            out.push((
                "front cover",
                format!("{} ({} bytes)", cover.mime_type, cover.data.len()),
            ));
        }
        out
    }
}
