//! Search term derivation and the bracket-stripping retry.
//!
//! Annotations such as "(Remastered 2009)" or "[Live]" in a title are a
//! common reason a catalog search comes back empty. When the first search
//! finds nothing, bracketed substrings are removed one at a time, rightmost
//! first, and the search is repeated after each removal.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::domain::{EnrichmentError, MatchRecord};
use super::mapper;
use super::traits::CatalogApi;
use crate::metadata::TagRecord;

/// Shortest `[...]` or `(...)` runs, left to right
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.+?\]|\(.+?\)").expect("bracket pattern is valid"));

/// Build the first search term for a file.
///
/// An explicit query wins; then "<artist> <title>" from existing tags;
/// then the file name without its extension. Nothing is normalized.
pub fn initial_term(query: Option<&str>, existing: Option<&TagRecord>, path: &Path) -> String {
    if let Some(query) = query
        && !query.is_empty()
    {
        return query.to_string();
    }

    if let Some(tag) = existing
        && let (Some(artist), Some(title)) = (non_empty(&tag.artist), non_empty(&tag.title))
    {
        return format!("{} {}", artist, title);
    }

    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// The successive terms tried after `term` fails, in order.
///
/// Brackets are found once up front; each step removes every occurrence
/// of the rightmost remaining one.
pub fn simplified_terms(term: &str) -> Vec<String> {
    let mut brackets: Vec<&str> = BRACKETED.find_iter(term).map(|m| m.as_str()).collect();
    let mut current = term.to_string();
    let mut terms = Vec::with_capacity(brackets.len());

    while let Some(bracket) = brackets.pop() {
        current = current.replace(bracket, "");
        terms.push(current.clone());
    }

    terms
}

/// Search for `term`, retrying with simplified terms until something matches.
///
/// Returns `Ok(None)` when every attempt came back empty.
pub async fn search_with_fallback<C: CatalogApi + ?Sized>(
    catalog: &C,
    term: &str,
) -> Result<Option<MatchRecord>, EnrichmentError> {
    if let Some(found) = mapper::lookup(catalog, term).await? {
        return Ok(Some(found));
    }

    for simplified in simplified_terms(term) {
        tracing::info!("No match for {:?}, retrying as {:?}", term, simplified);
        if let Some(found) = mapper::lookup(catalog, &simplified).await? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}
