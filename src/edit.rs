//! Tag deletion as a text edit
//!
//! Removing a tag means splicing its matched text out of the source file,
//! then tidying the affected line. The index is deliberately not updated
//! here: the edit shifts every subsequent offset in the file, so callers
//! must follow up with a re-scan of the same path.

use anyhow::{bail, Context, Result};

use crate::models::Tag;

/// Excise `tag.raw_text` from its source file and rewrite the file.
///
/// Fails without writing when the file no longer contains the tag's text
/// at its recorded offset; the on-disk file and the index then still agree
/// and a follow-up re-scan re-discovers whatever is actually there.
pub fn delete_tag(tag: &Tag) -> Result<()> {
    let text = std::fs::read_to_string(&tag.path)
        .with_context(|| format!("Failed to read {}", tag.path.display()))?;

    let end = tag.byte_offset + tag.raw_text.len();
    if text.get(tag.byte_offset..end) != Some(tag.raw_text.as_str()) {
        bail!(
            "{} changed since the tag was indexed; re-scan before deleting",
            tag.path.display()
        );
    }

    let edited = excise(&text, tag.byte_offset, tag.raw_text.len());

    std::fs::write(&tag.path, edited)
        .with_context(|| format!("Failed to write {}", tag.path.display()))?;

    log::info!(
        "Deleted tag '{}' from {:?}",
        tag.display_text(),
        tag.path
    );
    Ok(())
}

/// Remove `len` bytes at `offset` from `text` and reformat the edited
/// line: a line left blank is dropped entirely; otherwise the retained
/// prefix loses trailing whitespace, the retained suffix loses leading
/// whitespace, and when both remain non-empty they are joined by exactly
/// one space.
pub fn excise(text: &str, offset: usize, len: usize) -> String {
    let cut_end = offset + len;
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[cut_end..]
        .find('\n')
        .map(|i| cut_end + i)
        .unwrap_or(text.len());

    let prefix = text[line_start..offset].trim_end();
    let suffix = text[cut_end..line_end].trim_start();

    let mut out = String::with_capacity(text.len() - len);
    out.push_str(&text[..line_start]);

    match (prefix.is_empty(), suffix.is_empty()) {
        // Line became blank: drop it along with its newline.
        (true, true) => {
            if line_end < text.len() {
                out.push_str(&text[line_end + 1..]);
            }
        }
        (false, true) => {
            out.push_str(prefix);
            out.push_str(&text[line_end..]);
        }
        (true, false) => {
            out.push_str(suffix);
            out.push_str(&text[line_end..]);
        }
        (false, false) => {
            out.push_str(prefix);
            out.push(' ');
            out.push_str(suffix);
            out.push_str(&text[line_end..]);
        }
    }

    out
}
