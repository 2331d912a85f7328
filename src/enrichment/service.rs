//! Tagging service - drives one file from lookup to saved tag
//!
//! For each file:
//! 1. Load the existing tag and derive a search term
//! 2. Search the catalog (with bracket-stripping fallback)
//! 3. Optionally ask the operator to confirm a fuzzy match
//! 4. Assign mapped fields, year, cover art and (optionally) tempo/key
//! 5. Save, optionally rename, and optionally report a before/after diff
//!
//! Nothing is shared between files except the clients, so one file's
//! failure never affects the next.

use std::path::{Path, PathBuf};

use crate::enrichment::{
    analysis,
    domain::MatchRecord,
    mapper,
    query,
    traits::{CatalogApi, CoverArtApi},
};
use crate::error::Result;
use crate::metadata::{CoverImage, TagField, TagRecord, TagStore};
use crate::organizer;
use crate::report;

/// Per-run options, shared by every file
#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    /// Search term override
    pub query: Option<String>,
    /// Discard the file's existing tag instead of merging into it
    pub replace: bool,
    /// Rename template applied after tagging
    pub rename: Option<String>,
    /// Also fetch tempo and key
    pub analyze: bool,
    /// Compute everything, write nothing
    pub dry_run: bool,
    /// Confirm matches whose artist/title differ from the search term
    pub prompt: bool,
    /// Produce a before/after diff
    pub verbose: bool,
}

/// How processing of one file ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Tag saved; `path` is where the file now lives
    Tagged { path: PathBuf },
    /// Dry run: nothing written
    Previewed,
    /// Every search attempt came back empty
    NoMatch { term: String },
    /// The operator rejected the match
    Declined,
}

/// Result of processing one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
    /// Uncolored diff lines, present in verbose mode once a match was applied
    pub diff: Option<Vec<String>>,
}

/// Asks the operator whether a match is the right one
pub trait Confirm {
    /// `term` is what was searched, `found` the match as "artist title"
    fn confirm(&mut self, file: &Path, term: &str, found: &str) -> bool;
}

/// Runs the lookup-and-tag sequence for one file at a time
pub struct TaggingService<C, A, S> {
    catalog: C,
    covers: A,
    store: S,
}

impl<C, A, S> TaggingService<C, A, S>
where
    C: CatalogApi,
    A: CoverArtApi,
    S: TagStore,
{
    pub fn new(catalog: C, covers: A, store: S) -> Self {
        Self {
            catalog,
            covers,
            store,
        }
    }

    /// Tag one file.
    ///
    /// Remote errors after a match, unreadable files and failed saves are
    /// returned as errors. No match and a declined prompt are outcomes.
    pub async fn process(
        &self,
        path: &Path,
        options: &TagOptions,
        confirm: &mut dyn Confirm,
    ) -> Result<FileReport> {
        let existing = self.store.load(path)?;
        let term = query::initial_term(options.query.as_deref(), existing.as_ref(), path);
        tracing::debug!("Search term for {:?}: {:?}", path, term);

        let before = options
            .verbose
            .then(|| self.store.render(path, path, existing.as_ref()));

        let mut tag = match existing {
            Some(_) if options.replace && !options.dry_run => TagRecord::fresh(),
            Some(tag) => tag,
            None => TagRecord::fresh(),
        };

        let Some(found) = query::search_with_fallback(&self.catalog, &term).await? else {
            tracing::warn!("No match for {:?} ({})", term, path.display());
            return Ok(FileReport {
                path: path.to_path_buf(),
                outcome: Outcome::NoMatch { term },
                diff: None,
            });
        };

        let found_as = found.search_form();
        if options.prompt && term != found_as && !confirm.confirm(path, &term, &found_as) {
            tracing::info!("Skipping {:?}: match declined", path);
            return Ok(FileReport {
                path: path.to_path_buf(),
                outcome: Outcome::Declined,
                diff: None,
            });
        }

        self.apply_match(&mut tag, found, options.analyze).await;

        if !options.dry_run {
            self.store.save(path, &tag)?;
            tracing::info!("Tagged {:?}", path);
        }

        let mut final_path = path.to_path_buf();
        let mut shown_as = path.to_path_buf();
        if let Some(template) = &options.rename {
            let stem = organizer::render_template(template, &tag);
            if options.dry_run {
                shown_as = pending_name(path, &stem);
            } else {
                match self.store.rename(path, &stem) {
                    Ok(dest) => {
                        tracing::info!("Renamed {:?} -> {:?}", path, dest);
                        final_path = dest.clone();
                        shown_as = dest;
                    }
                    Err(e) => tracing::warn!("Could not rename {:?}: {}", path, e),
                }
            }
        }

        let diff = before.map(|before| {
            let after = self.store.render(&final_path, &shown_as, Some(&tag));
            report::diff_lines(&before, &after)
        });

        let outcome = if options.dry_run {
            Outcome::Previewed
        } else {
            Outcome::Tagged { path: final_path }
        };

        Ok(FileReport {
            path: path.to_path_buf(),
            outcome,
            diff,
        })
    }

    /// Assign the match's fields, year, cover and analysis onto `tag`
    async fn apply_match(&self, tag: &mut TagRecord, found: MatchRecord, analyze: bool) {
        let MatchRecord { fields, meta } = found;

        if let Some(year) = mapper::release_year(&fields.release_date) {
            tag.set(TagField::Year(year));
        }
        let assigned = tag.apply(fields.into_tag_fields());
        tracing::debug!("Assigned {} fields", assigned);

        if let Some(url) = &meta.image_url {
            match self.covers.download(url).await {
                Ok(art) => tag.set(TagField::FrontCover(CoverImage {
                    data: art.data,
                    mime_type: art.mime_type,
                })),
                Err(e) => tracing::debug!("No cover art from {}: {}", url, e),
            }
        }

        if analyze {
            match analysis::fetch_analysis(&self.catalog, &meta.track_id).await {
                Ok(found) => {
                    let bpm = found.tempo.round();
                    if bpm >= 1.0 {
                        tag.set(TagField::Bpm(bpm as u32));
                    }
                    if let Some(key) = found.key {
                        tag.set(TagField::Key(key.to_string()));
                    }
                }
                Err(e) => tracing::warn!("Audio analysis unavailable for {}: {}", meta.track_id, e),
            }
        }
    }
}

/// Where a rename to `stem` would put `path`
fn pending_name(path: &Path, stem: &str) -> PathBuf {
    match path.extension() {
        Some(ext) => path.with_file_name(format!("{}.{}", stem.trim(), ext.to_string_lossy())),
        None => path.with_file_name(stem.trim()),
    }
}
