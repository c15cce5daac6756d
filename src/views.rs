//! View data contracts
//!
//! The three downstream consumers of the tag index (the grouped list, the
//! per-editor highlight ranges, and the summary counter) each pull a
//! narrow slice of index state through the functions here. Views never
//! mutate the index; they are recomputed from it after it has settled.

use serde::Serialize;

use crate::index::TagIndex;
use crate::models::Tag;
use crate::pattern::Pattern;

/// One tag row in the grouped list view.
#[derive(Debug, Clone, Serialize)]
pub struct TagItem {
    /// Primary label: the tag's display text.
    pub label: String,
    /// Secondary label: the file's basename.
    pub description: String,
    /// Hover text with the full location.
    pub tooltip: String,
    /// The tag itself, carried so a "navigate" action can be invoked
    /// straight from the row.
    pub tag: Tag,
}

/// One pattern group in the grouped list view.
#[derive(Debug, Clone, Serialize)]
pub struct TagGroup {
    /// Pattern name, uppercased for display.
    pub label: String,
    pub count: usize,
    pub items: Vec<TagItem>,
}

/// Build the two-level tree for the list view: groups in pattern-set
/// order, rows in index (display) order.
pub fn build_tree(index: &TagIndex, patterns: &[Pattern]) -> Vec<TagGroup> {
    index
        .query_grouped(patterns, None)
        .into_iter()
        .map(|(name, tags)| TagGroup {
            label: name.to_uppercase(),
            count: tags.len(),
            items: tags
                .into_iter()
                .map(|tag| TagItem {
                    label: tag.display_text(),
                    description: tag.basename(),
                    tooltip: tag.tooltip(),
                    tag,
                })
                .collect(),
        })
        .collect()
}

/// Render the summary counter template.
///
/// `{all}` expands to the total tag count; `{name}` expands to the count
/// for the pattern with that name.
pub fn render_counter(template: &str, index: &TagIndex, patterns: &[Pattern]) -> String {
    let mut out = template.replace("{all}", &index.len().to_string());
    for pattern in patterns {
        let placeholder = format!("{{{}}}", pattern.name);
        if out.contains(&placeholder) {
            let count = index.query(&pattern.name, None).len();
            out = out.replace(&placeholder, &count.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefaultPatternSettings, PatternConfig};
    use std::path::Path;

    fn pattern(name: &str, source: &str) -> Pattern {
        let config = PatternConfig {
            name: Some(name.to_string()),
            pattern: Some(source.to_string()),
            ..PatternConfig::default()
        };
        Pattern::compile(&config, &DefaultPatternSettings::default()).unwrap()
    }

    fn populated_index(patterns: &[Pattern]) -> TagIndex {
        let mut index = TagIndex::new();
        index.update_for_file(
            patterns,
            Path::new("/ws/src/a.rs"),
            "// TODO: later\n// FIXME: now\n// TODO: eventually\n",
        );
        index
    }

    #[test]
    fn tree_groups_follow_pattern_order_with_uppercase_labels() {
        let patterns = vec![pattern("todo", "TODO:.*"), pattern("fixme", "FIXME:.*")];
        let tree = build_tree(&populated_index(&patterns), &patterns);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].label, "TODO");
        assert_eq!(tree[0].count, 2);
        assert_eq!(tree[1].label, "FIXME");
        assert_eq!(tree[1].count, 1);
        assert_eq!(tree[0].items[0].description, "a.rs");
    }

    #[test]
    fn empty_patterns_still_get_a_group() {
        let patterns = vec![pattern("todo", "TODO:.*"), pattern("hack", "HACK:.*")];
        let tree = build_tree(&populated_index(&patterns), &patterns);

        assert_eq!(tree[1].label, "HACK");
        assert_eq!(tree[1].count, 0);
        assert!(tree[1].items.is_empty());
    }

    #[test]
    fn counter_substitutes_total_and_per_pattern_counts() {
        let patterns = vec![pattern("todo", "TODO:.*"), pattern("fixme", "FIXME:.*")];
        let index = populated_index(&patterns);

        assert_eq!(render_counter("tags: {all}", &index, &patterns), "tags: 3");
        assert_eq!(
            render_counter("{todo} todo / {fixme} fixme", &index, &patterns),
            "2 todo / 1 fixme"
        );
    }

    #[test]
    fn counter_leaves_unknown_placeholders_alone() {
        let patterns = vec![pattern("todo", "TODO:.*")];
        let index = populated_index(&patterns);

        assert_eq!(
            render_counter("{all} {nope}", &index, &patterns),
            "2 {nope}"
        );
    }
}
