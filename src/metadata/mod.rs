//! Audio file tag reading and writing.
//!
//! Uses the lofty crate for format-independent metadata access.
//! Supports reading from and writing to MP3, FLAC, OGG, M4A, and WAV files.
//!
//! # Features
//! - Read the primary tag into a [`TagRecord`]
//! - Write a record back, either merged into the existing tag or replacing it
//! - Render a file's tag state as plain text for before/after reports

mod record;

pub use record::{CoverImage, TagField, TagRecord};

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, ResultExt};
use crate::organizer;

/// Width of the separator lines in rendered reports
const RULE_WIDTH: usize = 60;

/// Reads, writes, renames and renders one file's tags.
///
/// Implement this trait to substitute an in-memory store in tests.
pub trait TagStore {
    /// Read the file's tag, `None` if it carries none
    fn load(&self, path: &Path) -> Result<Option<TagRecord>>;

    /// Persist `tag` to the file
    fn save(&self, path: &Path, tag: &TagRecord) -> Result<()>;

    /// Rename the file within its directory to `stem` (extension kept)
    fn rename(&self, path: &Path, stem: &str) -> Result<PathBuf>;

    /// Text snapshot of the file's tag state, headed by `shown_as`.
    ///
    /// `shown_as` differs from `path` when previewing a rename.
    fn render(&self, _path: &Path, shown_as: &Path, tag: Option<&TagRecord>) -> String {
        render_text(shown_as, &[], tag)
    }
}

impl<S: TagStore + ?Sized> TagStore for &S {
    fn load(&self, path: &Path) -> Result<Option<TagRecord>> {
        (**self).load(path)
    }

    fn save(&self, path: &Path, tag: &TagRecord) -> Result<()> {
        (**self).save(path, tag)
    }

    fn rename(&self, path: &Path, stem: &str) -> Result<PathBuf> {
        (**self).rename(path, stem)
    }

    fn render(&self, path: &Path, shown_as: &Path, tag: Option<&TagRecord>) -> String {
        (**self).render(path, shown_as, tag)
    }
}

/// Render a file header, optional extra header lines and the tag fields
pub fn render_text(path: &Path, header: &[String], tag: Option<&TagRecord>) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&path.display().to_string());
    out.push('\n');
    for line in header {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');

    match tag {
        Some(tag) => {
            for (label, value) in tag.display_fields() {
                out.push_str(&format!("{:>13}: {}\n", label, value));
            }
        }
        None => out.push_str("No tag\n"),
    }

    out.push_str(&rule);
    out.push('\n');
    out
}

/// [`TagStore`] backed by lofty
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyStore;

impl TagStore for LoftyStore {
    fn load(&self, path: &Path) -> Result<Option<TagRecord>> {
        if !path.is_file() {
            return Err(Error::not_found(path));
        }

        let tagged_file = Probe::open(path)
            .map_err(|e| Error::metadata(path, format!("Failed to open file: {}", e)))?
            .read()
            .map_err(|e| Error::metadata(path, format!("Failed to read tags: {}", e)))?;

        // Get the primary tag, or fall back to the first available tag
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag());

        Ok(tag.map(record_from_tag))
    }

    fn save(&self, path: &Path, record: &TagRecord) -> Result<()> {
        let tagged_file = Probe::open(path)
            .map_err(|e| Error::metadata(path, format!("Failed to open file for writing: {}", e)))?
            .read()
            .map_err(|e| Error::metadata(path, format!("Failed to read file: {}", e)))?;

        let tag_type = tagged_file.primary_tag_type();

        let mut tag = if record.fresh {
            Tag::new(tag_type)
        } else {
            tagged_file
                .primary_tag()
                .cloned()
                .unwrap_or_else(|| Tag::new(tag_type))
        };

        write_record(&mut tag, record);

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| Error::metadata(path, format!("Failed to write tags: {}", e)))?;

        tracing::debug!("Saved tags to {:?}", path);
        Ok(())
    }

    fn rename(&self, path: &Path, stem: &str) -> Result<PathBuf> {
        organizer::rename_in_place(path, stem)
            .with_context(format!("Failed to rename {}", path.display()))
    }

    fn render(&self, path: &Path, shown_as: &Path, tag: Option<&TagRecord>) -> String {
        render_text(shown_as, &file_header(path), tag)
    }
}

/// Size and audio properties, best effort
fn file_header(path: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if let Ok(meta) = std::fs::metadata(path) {
        lines.push(format!("Size: {}", format_size(meta.len())));
    }

    if let Ok(tagged_file) = Probe::open(path).and_then(|p| p.read()) {
        let props = tagged_file.properties();
        let secs = props.duration().as_secs();
        let mut line = format!("Time: {}:{:02}", secs / 60, secs % 60);
        if let Some(bitrate) = props.audio_bitrate() {
            line.push_str(&format!("  [ {} kb/s", bitrate));
            if let Some(rate) = props.sample_rate() {
                line.push_str(&format!(" @ {} Hz", rate));
            }
            line.push_str(" ]");
        }
        lines.push(line);
    }

    lines
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB {
        format!("{:.2} MB", b / (KB * KB))
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

fn record_from_tag(tag: &Tag) -> TagRecord {
    let text = |key: ItemKey| tag.get_string(&key).map(str::to_string);

    let bpm = tag
        .get_string(&ItemKey::IntegerBpm)
        .or_else(|| tag.get_string(&ItemKey::Bpm))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|v| v.round() as u32);

    let front_cover = tag
        .pictures()
        .iter()
        .find(|p| p.pic_type() == PictureType::CoverFront)
        .map(|p| CoverImage {
            data: p.data().to_vec(),
            mime_type: p
                .mime_type()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "image/jpeg".to_string()),
        });

    TagRecord {
        title: tag.title().map(|s| s.into_owned()),
        artist: tag.artist().map(|s| s.into_owned()),
        album_artist: text(ItemKey::AlbumArtist),
        album: tag.album().map(|s| s.into_owned()),
        track_number: tag.track(),
        disc_number: tag.disk(),
        disc_total: tag.disk_total(),
        release_date: text(ItemKey::RecordingDate),
        year: tag.year().and_then(|y| i32::try_from(y).ok()),
        genre: tag.genre().map(|s| s.into_owned()),
        publisher: text(ItemKey::Label).or_else(|| text(ItemKey::Publisher)),
        bpm,
        key: text(ItemKey::InitialKey),
        front_cover,
        fresh: false,
    }
}

fn write_record(tag: &mut Tag, record: &TagRecord) {
    if let Some(ref title) = record.title {
        tag.set_title(title.clone());
    }
    if let Some(ref artist) = record.artist {
        tag.set_artist(artist.clone());
    }
    if let Some(ref album_artist) = record.album_artist {
        tag.insert_text(ItemKey::AlbumArtist, album_artist.clone());
    }
    if let Some(ref album) = record.album {
        tag.set_album(album.clone());
    }
    if let Some(track) = record.track_number {
        tag.set_track(track);
    }
    if let Some(disc) = record.disc_number {
        tag.set_disk(disc);
    }
    if let Some(total) = record.disc_total {
        tag.set_disk_total(total);
    }
    if let Some(ref date) = record.release_date {
        tag.insert_text(ItemKey::RecordingDate, date.clone());
    }
    if let Some(year) = record.year
        && let Ok(year) = u32::try_from(year)
    {
        tag.set_year(year);
    }
    if let Some(ref genre) = record.genre {
        tag.set_genre(genre.clone());
    }
    if let Some(ref publisher) = record.publisher {
        // ID3v2 stores the label as TPUB, which lofty reads back as Label
        if !tag.insert_text(ItemKey::Label, publisher.clone()) {
            tag.insert_text(ItemKey::Publisher, publisher.clone());
        }
    }
    if let Some(bpm) = record.bpm {
        // Not every format has an integer BPM field
        if !tag.insert_text(ItemKey::IntegerBpm, bpm.to_string()) {
            tag.insert_text(ItemKey::Bpm, bpm.to_string());
        }
    }
    if let Some(ref key) = record.key {
        tag.insert_text(ItemKey::InitialKey, key.clone());
    }
    if let Some(ref cover) = record.front_cover {
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::from_str(&cover.mime_type)),
            None,
            cover.data.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::tag::TagType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_non_audio_file_returns_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "This is just some text, not music.").expect("Failed to write");

        let result = LoftyStore.load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_non_existent_file_returns_error() {
        let result = LoftyStore.load(Path::new("non_existent_file.mp3"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_save_non_audio_file_returns_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "Not an audio file").expect("Failed to write");

        let result = LoftyStore.save(file.path(), &TagRecord::fresh());
        assert!(matches!(result, Err(Error::Metadata { .. })));
    }

    #[test]
    fn test_record_roundtrips_through_lofty_tag() {
        let record = TagRecord {
            title: Some("Title".to_string()),
            artist: Some("A/B".to_string()),
            album_artist: Some("A".to_string()),
            album: Some("Album".to_string()),
            track_number: Some(3),
            disc_number: Some(1),
            disc_total: Some(2),
            genre: Some("Pop ,Rock".to_string()),
            key: Some("F#".to_string()),
            bpm: Some(128),
            front_cover: Some(CoverImage {
                data: vec![0xFF, 0xD8, 0xFF],
                mime_type: "image/jpeg".to_string(),
            }),
            ..Default::default()
        };

        let mut tag = Tag::new(TagType::Id3v2);
        write_record(&mut tag, &record);
        let read_back = record_from_tag(&tag);

        assert_eq!(read_back.title, record.title);
        assert_eq!(read_back.artist, record.artist);
        assert_eq!(read_back.album_artist, record.album_artist);
        assert_eq!(read_back.track_number, Some(3));
        assert_eq!(read_back.disc_number, Some(1));
        assert_eq!(read_back.disc_total, Some(2));
        assert_eq!(read_back.genre, record.genre);
        assert_eq!(read_back.key, record.key);
        assert_eq!(read_back.bpm, Some(128));
        assert_eq!(read_back.front_cover, record.front_cover);
    }

    #[test]
    fn test_cover_replaces_existing_front_cover() {
        let mut tag = Tag::new(TagType::Id3v2);
        let first = TagRecord {
            front_cover: Some(CoverImage {
                data: vec![1],
                mime_type: "image/png".to_string(),
            }),
            ..Default::default()
        };
        let second = TagRecord {
            front_cover: Some(CoverImage {
                data: vec![2, 2],
                mime_type: "image/jpeg".to_string(),
            }),
            ..Default::default()
        };

        write_record(&mut tag, &first);
        write_record(&mut tag, &second);

        let covers: Vec<_> = tag
            .pictures()
            .iter()
            .filter(|p| p.pic_type() == PictureType::CoverFront)
            .collect();
        assert_eq!(covers.len(), 1);
        assert_eq!(covers[0].data(), &[2, 2]);
    }

    /// A short silent MPEG1 Layer III stream with no tags
    fn mp3_fixture() -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".mp3")
            .tempfile()
            .expect("Failed to create temp file");
        // 128 kb/s @ 44.1 kHz, no padding: 417 bytes per frame
        let mut frame = vec![0u8; 417];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        for _ in 0..40 {
            file.write_all(&frame).expect("Failed to write");
        }
        file.flush().expect("Failed to flush");
        file
    }

    fn front_covers(path: &Path) -> Vec<Vec<u8>> {
        let tagged_file = Probe::open(path).unwrap().read().unwrap();
        tagged_file
            .primary_tag()
            .map(|tag| {
                tag.pictures()
                    .iter()
                    .filter(|p| p.pic_type() == PictureType::CoverFront)
                    .map(|p| p.data().to_vec())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn full_record() -> TagRecord {
        TagRecord {
            title: Some("Title".to_string()),
            artist: Some("A/B".to_string()),
            album_artist: Some("A".to_string()),
            album: Some("Album".to_string()),
            track_number: Some(3),
            disc_number: Some(1),
            disc_total: Some(2),
            release_date: Some("2020-05-01".to_string()),
            year: Some(2020),
            genre: Some("Pop ,Rock".to_string()),
            publisher: Some("Label".to_string()),
            bpm: Some(128),
            key: Some("F#".to_string()),
            front_cover: Some(CoverImage {
                data: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
                mime_type: "image/jpeg".to_string(),
            }),
            fresh: true,
        }
    }

    #[test]
    fn test_untagged_mp3_loads_as_none() {
        let file = mp3_fixture();
        assert_eq!(LoftyStore.load(file.path()).unwrap(), None);
    }

    #[test]
    fn test_mp3_save_and_load_every_field() {
        let file = mp3_fixture();
        let record = full_record();

        LoftyStore.save(file.path(), &record).unwrap();
        let read_back = LoftyStore.load(file.path()).unwrap().expect("tag written");

        assert_eq!(read_back.title, record.title);
        assert_eq!(read_back.artist, record.artist);
        assert_eq!(read_back.album_artist, record.album_artist);
        assert_eq!(read_back.album, record.album);
        assert_eq!(read_back.track_number, Some(3));
        assert_eq!(read_back.disc_number, Some(1));
        assert_eq!(read_back.disc_total, Some(2));
        assert_eq!(read_back.release_date.as_deref(), Some("2020-05-01"));
        assert_eq!(read_back.year, Some(2020));
        assert_eq!(read_back.genre, record.genre);
        assert_eq!(read_back.publisher.as_deref(), Some("Label"));
        assert_eq!(read_back.bpm, Some(128));
        assert_eq!(read_back.key, record.key);
        assert_eq!(read_back.front_cover, record.front_cover);
    }

    #[test]
    fn test_mp3_merge_keeps_existing_fields() {
        let file = mp3_fixture();
        LoftyStore.save(file.path(), &full_record()).unwrap();

        let update = TagRecord {
            title: Some("New Title".to_string()),
            ..Default::default()
        };
        LoftyStore.save(file.path(), &update).unwrap();

        let read_back = LoftyStore.load(file.path()).unwrap().unwrap();
        assert_eq!(read_back.title.as_deref(), Some("New Title"));
        assert_eq!(read_back.album.as_deref(), Some("Album"));
        assert_eq!(read_back.publisher.as_deref(), Some("Label"));
        assert_eq!(read_back.year, Some(2020));
    }

    #[test]
    fn test_mp3_fresh_record_replaces_tag() {
        let file = mp3_fixture();
        LoftyStore.save(file.path(), &full_record()).unwrap();

        let replacement = TagRecord {
            title: Some("Only Title".to_string()),
            ..TagRecord::fresh()
        };
        LoftyStore.save(file.path(), &replacement).unwrap();

        let read_back = LoftyStore.load(file.path()).unwrap().unwrap();
        assert_eq!(read_back.title.as_deref(), Some("Only Title"));
        assert_eq!(read_back.album, None);
        assert_eq!(read_back.publisher, None);
        assert_eq!(read_back.front_cover, None);
    }

    #[test]
    fn test_mp3_front_cover_replaced_on_disk() {
        let file = mp3_fixture();
        LoftyStore.save(file.path(), &full_record()).unwrap();

        let new_cover = TagRecord {
            front_cover: Some(CoverImage {
                data: vec![0x89, 0x50, 0x4E, 0x47],
                mime_type: "image/png".to_string(),
            }),
            ..Default::default()
        };
        LoftyStore.save(file.path(), &new_cover).unwrap();

        assert_eq!(front_covers(file.path()), vec![vec![0x89, 0x50, 0x4E, 0x47]]);
        let read_back = LoftyStore.load(file.path()).unwrap().unwrap();
        assert_eq!(read_back.front_cover, new_cover.front_cover);
    }

    #[test]
    fn test_mp3_render_has_file_header() {
        let file = mp3_fixture();
        let text = LoftyStore.render(file.path(), file.path(), None);
        assert!(text.contains("Size: "));
        assert!(text.contains("No tag"));
    }

    #[test]
    fn test_publisher_written_as_label() {
        let mut tag = Tag::new(TagType::Id3v2);
        let record = TagRecord {
            publisher: Some("Label".to_string()),
            ..Default::default()
        };
        write_record(&mut tag, &record);

        assert_eq!(tag.get_string(&ItemKey::Label), Some("Label"));
        assert_eq!(record_from_tag(&tag).publisher.as_deref(), Some("Label"));
    }

    #[test]
    fn test_render_text_without_tag() {
        let text = render_text(Path::new("/music/a.mp3"), &[], None);
        assert!(text.starts_with("/music/a.mp3\n"));
        assert!(text.contains("No tag"));
    }

    #[test]
    fn test_render_text_lists_fields() {
        let tag = TagRecord {
            title: Some("Title".to_string()),
            year: Some(2020),
            ..Default::default()
        };
        let text = render_text(Path::new("a.mp3"), &["Size: 1 bytes".to_string()], Some(&tag));
        assert!(text.contains("Size: 1 bytes"));
        assert!(text.contains("        title: Title\n"));
        assert!(text.contains("         year: 2020\n"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
