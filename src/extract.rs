//! Match extraction
//!
//! Pure functions from (pattern, document text) to match descriptors. No
//! I/O happens here; callers hand in already-loaded text and get back the
//! ordered matches. [`extract_all`] is the only place in the crate that
//! constructs [`Tag`] values.

use std::path::Path;

use crate::models::{Position, Tag};
use crate::pattern::Pattern;

/// One raw regex match: byte offset, full matched text, and the
/// participating capture groups in group order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub offset: usize,
    pub text: String,
    pub captures: Vec<String>,
}

/// Byte-offset to line/column mapping for one document version.
///
/// Built fresh for every scan; an edit shifts every subsequent offset, so a
/// map must never be reused across document versions.
#[derive(Debug)]
pub struct LineMap {
    /// Byte offsets where each line starts. `line_starts[0] == 0` always.
    line_starts: Vec<usize>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Translate a byte offset into a 0-indexed line/column position.
    pub fn position_at(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        };
        Position::new(line, offset - self.line_starts[line])
    }
}

/// Run one pattern over a document, collecting every match in offset order.
pub fn extract(pattern: &Pattern, text: &str) -> Vec<RawMatch> {
    let mut matches = Vec::new();
    let mut at = 0;

    while at <= text.len() {
        let caps = match pattern.regex.captures_at(text, at) {
            Some(caps) => caps,
            None => break,
        };
        let full = caps.get(0).expect("group 0 is the whole match");

        matches.push(RawMatch {
            offset: full.start(),
            text: full.as_str().to_string(),
            captures: caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect(),
        });

        // A zero-width match must still advance the search position, one
        // character at a time, or the loop would never terminate.
        at = if full.end() > full.start() {
            full.end()
        } else {
            match text[full.end()..].chars().next() {
                Some(c) => full.end() + c.len_utf8(),
                None => break,
            }
        };
    }

    matches
}

/// Run every pattern over a document and build the resulting tags.
///
/// Patterns are applied in set order; matches from different patterns are
/// kept independently even when they cover overlapping regions.
pub fn extract_all(patterns: &[Pattern], path: &Path, text: &str) -> Vec<Tag> {
    let map = LineMap::new(text);
    let mut tags = Vec::new();

    for pattern in patterns {
        for m in extract(pattern, text) {
            tags.push(Tag {
                pattern: pattern.name.clone(),
                raw_text: m.text.clone(),
                captures: m.captures,
                path: path.to_path_buf(),
                byte_offset: m.offset,
                start: map.position_at(m.offset),
                end: map.position_at(m.offset + m.text.len()),
            });
        }
    }

    log::debug!("Extracted {} tag(s) from {:?}", tags.len(), path);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefaultPatternSettings, PatternConfig};
    use std::path::PathBuf;

    fn pattern(name: &str, source: &str) -> Pattern {
        let config = PatternConfig {
            name: Some(name.to_string()),
            pattern: Some(source.to_string()),
            ..PatternConfig::default()
        };
        Pattern::compile(&config, &DefaultPatternSettings::default()).unwrap()
    }

    #[test]
    fn matches_come_back_in_offset_order_and_deterministically() {
        let p = pattern("todo", "TODO");
        let text = "TODO one\nmiddle\nTODO two TODO three\n";

        let first = extract(&p, text);
        let second = extract(&p, text);

        assert_eq!(first.len(), 3);
        assert!(first.windows(2).all(|w| w[0].offset < w[1].offset));
        assert_eq!(first, second);
    }

    #[test]
    fn zero_width_matches_terminate() {
        let p = pattern("stars", "x*");
        let matches = extract(&p, "axa");

        // One match per position, including the empty ones; the point is
        // that the loop finishes.
        assert!(matches.iter().any(|m| m.text == "x"));
        assert!(matches.len() >= 3);
    }

    #[test]
    fn zero_width_advance_respects_multibyte_characters() {
        let p = pattern("empty", "q*");
        let matches = extract(&p, "héllo");
        assert!(matches.iter().all(|m| m.text.is_empty()));
    }

    #[test]
    fn capture_groups_are_collected_in_order() {
        let p = pattern("assign", r"(\w+)\s*=\s*(\w+)");
        let matches = extract(&p, "a = b");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].captures, vec!["a", "b"]);
    }

    #[test]
    fn todo_scenario_yields_one_tag_with_expected_position() {
        let p = pattern("TODO", "TODO:.*");
        let text = "// TODO: fix this\nok\n";

        let tags = extract_all(&[p], &PathBuf::from("/ws/a.rs"), text);

        assert_eq!(tags.len(), 1);
        let tag = &tags[0];
        assert_eq!(tag.raw_text, "TODO: fix this");
        assert_eq!(tag.display_text(), "TODO: fix this");
        assert_eq!(tag.byte_offset, 3);
        assert_eq!(tag.start, Position::new(0, 3));
        assert_eq!(tag.end, Position::new(0, 17));
    }

    #[test]
    fn overlapping_patterns_produce_independent_tags() {
        let todo = pattern("todo", "TODO:.*");
        let word = pattern("word", "fix");
        let text = "// TODO: fix this\n";

        let tags = extract_all(&[todo, word], &PathBuf::from("/ws/a.rs"), text);

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].pattern, "todo");
        assert_eq!(tags[1].pattern, "word");
    }

    #[test]
    fn line_map_translates_offsets_across_lines() {
        let map = LineMap::new("ab\ncd\n");

        assert_eq!(map.position_at(0), Position::new(0, 0));
        assert_eq!(map.position_at(2), Position::new(0, 2));
        assert_eq!(map.position_at(3), Position::new(1, 0));
        assert_eq!(map.position_at(6), Position::new(2, 0));
    }
}
