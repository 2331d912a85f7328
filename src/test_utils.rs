//! Test utilities and fixtures for id3spot tests.
//!
//! Catalog fixtures that map to a predictable tag, plus an in-memory
//! [`TagStore`] that records what the orchestrator did to each file.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{mock_album, mock_track, MockTagStore};
//!
//! let catalog = MockCatalog::single_match("track", mock_track(), mock_album());
//! let store = MockTagStore::new();
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::enrichment::domain::{AlbumRef, CatalogAlbum, CatalogTrack, PagedTrack, TrackPage};
use crate::error::{Error, Result};
use crate::metadata::{TagRecord, TagStore};

/// A catalog track that maps to artist "Artist", title "Title", disc 1.
///
/// Customize with struct update syntax:
///
/// ```ignore
/// let remix = CatalogTrack {
///     name: "Title - Someone Remix".to_string(),
///     ..mock_track()
/// };
/// ```
pub fn mock_track() -> CatalogTrack {
    CatalogTrack {
        id: "track-1".to_string(),
        name: "Title".to_string(),
        artists: vec!["Artist".to_string()],
        track_number: 1,
        disc_number: 1,
        album: AlbumRef {
            id: "album-1".to_string(),
            name: "Album".to_string(),
            images: vec![
                "https://i.example.com/large.jpg".to_string(),
                "https://i.example.com/small.jpg".to_string(),
            ],
        },
    }
}

/// The album [`mock_track`] belongs to: one disc, released 2020-05-01.
pub fn mock_album() -> CatalogAlbum {
    CatalogAlbum {
        id: "album-1".to_string(),
        name: "Album".to_string(),
        artists: vec!["Artist".to_string()],
        release_date: Some("2020-05-01".to_string()),
        genres: vec!["Pop".to_string()],
        label: Some("Label".to_string()),
        images: vec!["https://i.example.com/large.jpg".to_string()],
        tracks: TrackPage {
            items: vec![
                PagedTrack { disc_number: 1 },
                PagedTrack { disc_number: 1 },
            ],
            next: None,
        },
    }
}

/// Something the orchestrator did to a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Save(PathBuf),
    Rename { from: PathBuf, stem: String },
}

/// In-memory [`TagStore`] keyed by path.
#[derive(Default)]
pub struct MockTagStore {
    tags: Mutex<HashMap<PathBuf, TagRecord>>,
    events: Mutex<Vec<StoreEvent>>,
    /// Make every rename fail with an I/O error
    pub fail_rename: bool,
}

impl MockTagStore {
    /// A store where no file carries a tag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `path` an existing tag.
    pub fn with_tag(self, path: impl Into<PathBuf>, tag: TagRecord) -> Self {
        self.tags.lock().unwrap().insert(path.into(), tag);
        self
    }

    /// Make renames fail.
    pub fn failing_rename(mut self) -> Self {
        self.fail_rename = true;
        self
    }

    /// Calls made so far, in order.
    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }

    /// The tag currently stored for `path`.
    pub fn tag(&self, path: impl AsRef<Path>) -> Option<TagRecord> {
        self.tags.lock().unwrap().get(path.as_ref()).cloned()
    }
}

impl TagStore for MockTagStore {
    fn load(&self, path: &Path) -> Result<Option<TagRecord>> {
        Ok(self.tag(path))
    }

    fn save(&self, path: &Path, tag: &TagRecord) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(StoreEvent::Save(path.to_path_buf()));
        let stored = TagRecord {
            fresh: false,
            ..tag.clone()
        };
        self.tags.lock().unwrap().insert(path.to_path_buf(), stored);
        Ok(())
    }

    fn rename(&self, path: &Path, stem: &str) -> Result<PathBuf> {
        self.events.lock().unwrap().push(StoreEvent::Rename {
            from: path.to_path_buf(),
            stem: stem.to_string(),
        });
        if self.fail_rename {
            return Err(Error::Io(std::io::Error::other("read-only file system")));
        }

        let dest = match path.extension() {
            Some(ext) => path.with_file_name(format!("{}.{}", stem, ext.to_string_lossy())),
            None => path.with_file_name(stem),
        };
        let mut tags = self.tags.lock().unwrap();
        if let Some(tag) = tags.remove(path) {
            tags.insert(dest.clone(), tag);
        }
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_track_belongs_to_mock_album() {
        assert_eq!(mock_track().album.id, mock_album().id);
    }

    #[test]
    fn test_mock_store_save_and_load() {
        let store = MockTagStore::new();
        let path = Path::new("/music/a.mp3");
        assert!(store.load(path).unwrap().is_none());

        store.save(path, &TagRecord::fresh()).unwrap();

        let loaded = store.load(path).unwrap().unwrap();
        assert!(!loaded.fresh);
        assert_eq!(store.events(), vec![StoreEvent::Save(path.to_path_buf())]);
    }

    #[test]
    fn test_mock_store_rename_moves_tag() {
        let store = MockTagStore::new().with_tag("/music/a.mp3", TagRecord::default());

        let dest = store.rename(Path::new("/music/a.mp3"), "b").unwrap();

        assert_eq!(dest, PathBuf::from("/music/b.mp3"));
        assert!(store.tag("/music/b.mp3").is_some());
        assert!(store.tag("/music/a.mp3").is_none());
    }

    #[test]
    fn test_mock_store_failing_rename() {
        let store = MockTagStore::new().failing_rename();
        assert!(store.rename(Path::new("/music/a.mp3"), "b").is_err());
        assert_eq!(store.events().len(), 1);
    }
}
