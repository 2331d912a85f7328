//! Template-based file renaming.
//!
//! Renders names like `$artist - $title` from a file's tags and renames the
//! file within its own directory, keeping the extension.
//!
//! # Placeholders
//! `$artist`, `$album_artist`, `$album`, `$title`, `$genre`, `$publisher`,
//! `$year`, `$release_date`, `$bpm`, `$key`, `$track:num`, `$disc:num`,
//! `$disc:total`. Any of them may be written `${name}`; `$$` is a literal `$`.
//! Numbers are zero-padded to two digits. Unknown placeholders are left as-is.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::metadata::TagRecord;

/// Template used by `--magic`
pub const MAGIC_TEMPLATE: &str = "$artist - $title";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\$|\{[a-z_]+(?::[a-z]+)?\}|[a-z_]+(?::[a-z]+)?)")
        .expect("placeholder pattern is valid")
});

/// Substitute tag values into `template`
pub fn render_template(template: &str, tag: &TagRecord) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let raw = &caps[1];
            if raw == "$" {
                return "$".to_string();
            }
            let name = raw.trim_start_matches('{').trim_end_matches('}');
            match placeholder_value(name, tag) {
                Some(value) => sanitize_filename(&value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Value for a known placeholder (empty if the tag lacks it); `None` if unknown
fn placeholder_value(name: &str, tag: &TagRecord) -> Option<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let padded = |v: Option<u32>| v.map(|n| format!("{:02}", n)).unwrap_or_default();

    let value = match name {
        "artist" => text(&tag.artist),
        "album_artist" => text(&tag.album_artist),
        "album" => text(&tag.album),
        "title" => text(&tag.title),
        "genre" => text(&tag.genre),
        "publisher" => text(&tag.publisher),
        "release_date" => text(&tag.release_date),
        "key" => text(&tag.key),
        "year" => tag.year.map(|y| y.to_string()).unwrap_or_default(),
        "bpm" => tag.bpm.map(|b| b.to_string()).unwrap_or_default(),
        "track" | "track:num" => padded(tag.track_number),
        "disc" | "disc:num" => padded(tag.disc_number),
        "disc:total" => padded(tag.disc_total),
        _ => return None,
    };
    Some(value)
}

/// Rename `path` to `<stem>.<original extension>` in the same directory.
///
/// Fails with `AlreadyExists` rather than overwrite another file.
pub fn rename_in_place(path: &Path, stem: &str) -> io::Result<PathBuf> {
    let stem = stem.trim();
    if stem.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "rename template produced an empty name",
        ));
    }
    if stem.contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("new name {:?} contains a path separator", stem),
        ));
    }

    let mut name = OsString::from(stem);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    let dest = path.with_file_name(name);

    if dest == path {
        return Ok(dest);
    }
    if dest.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dest.display()),
        ));
    }

    fs::rename(path, &dest)?;
    Ok(dest)
}

/// Sanitizes a filename by removing/replacing invalid characters
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
