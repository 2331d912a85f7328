//! Before/after reports of a file's tag state.
//!
//! Produces an ndiff-style line diff: `  ` unchanged, `- ` removed,
//! `+ ` added, and `? ` hint lines under near-identical changed lines that
//! point at the differing characters (`^` replaced, `-` deleted, `+` inserted).
//! [`colorize`] then colors each line by its leading marker.

use colored::Colorize;
use similar::{DiffTag, TextDiff};

/// Changed lines at least this similar get character hints
const HINT_THRESHOLD: f32 = 0.75;

/// Diff two multi-line snapshots into marker-prefixed lines
pub fn diff_lines(before: &str, after: &str) -> Vec<String> {
    let diff = TextDiff::from_lines(before, after);
    let old = diff.old_slices();
    let new = diff.new_slices();
    let mut out = Vec::new();

    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                out.extend(old[old_range].iter().map(|l| format!("  {}", strip_eol(l))));
            }
            DiffTag::Delete => {
                out.extend(old[old_range].iter().map(|l| format!("- {}", strip_eol(l))));
            }
            DiffTag::Insert => {
                out.extend(new[new_range].iter().map(|l| format!("+ {}", strip_eol(l))));
            }
            DiffTag::Replace => replaced_block(&old[old_range], &new[new_range], &mut out),
        }
    }

    out
}

/// Pair removed and added lines; similar pairs get hint lines
fn replaced_block(old: &[&str], new: &[&str], out: &mut Vec<String>) {
    let paired = old.len().min(new.len());

    for (a, b) in old.iter().zip(new.iter()) {
        let (a, b) = (strip_eol(a), strip_eol(b));
        let chars = TextDiff::from_chars(a, b);

        if chars.ratio() < HINT_THRESHOLD {
            out.push(format!("- {}", a));
            out.push(format!("+ {}", b));
            continue;
        }

        let (old_marks, new_marks) = char_marks(&chars);
        out.push(format!("- {}", a));
        push_hint(&old_marks, out);
        out.push(format!("+ {}", b));
        push_hint(&new_marks, out);
    }

    out.extend(old[paired..].iter().map(|l| format!("- {}", strip_eol(l))));
    out.extend(new[paired..].iter().map(|l| format!("+ {}", strip_eol(l))));
}

/// Marker strings aligned under the old and new line
fn char_marks(chars: &TextDiff<'_, '_, '_, str>) -> (String, String) {
    let mut old_marks = String::new();
    let mut new_marks = String::new();

    for op in chars.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let (old_mark, new_mark) = match tag {
            DiffTag::Equal => (' ', ' '),
            DiffTag::Delete => ('-', ' '),
            DiffTag::Insert => (' ', '+'),
            DiffTag::Replace => ('^', '^'),
        };
        if !matches!(tag, DiffTag::Insert) {
            old_marks.extend(std::iter::repeat_n(old_mark, old_range.len()));
        }
        if !matches!(tag, DiffTag::Delete) {
            new_marks.extend(std::iter::repeat_n(new_mark, new_range.len()));
        }
    }

    (old_marks, new_marks)
}

fn push_hint(marks: &str, out: &mut Vec<String>) {
    let marks = marks.trim_end();
    if !marks.is_empty() {
        out.push(format!("? {}", marks));
    }
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Color a diff line by its leading marker
pub fn colorize(line: &str) -> String {
    match line.chars().next() {
        Some('+') => line.green().to_string(),
        Some('-') => line.red().to_string(),
        Some('?') => line.blue().to_string(),
        _ => line.to_string(),
    }
}

/// True when the snapshots differ at all
pub fn has_changes(lines: &[String]) -> bool {
    lines.iter().any(|l| !l.starts_with("  "))
}
