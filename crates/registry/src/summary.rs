//! Condensed text index of a registry tree.

use crate::document::RegistryTree;
use crate::model::scalar_text;
use serde_yaml::{Mapping, Value};

/// Maximum number of lines in a summary, header included.
pub const SUMMARY_MAX_LINES: usize = 80;

/// Sections left out of the index.
const SKIPPED_SECTIONS: [&str; 2] = ["CHANGELOG", "METADATA"];

/// Render the registry's keys and list entries as an indented index.
///
/// Mapping keys print as `KEY:` one level deeper than their parent; list
/// entries print as `- name (status)`. Entries without a name are dropped.
pub fn summarize(tree: &RegistryTree) -> String {
    let mut lines = vec!["[KNOWLEDGE INDEX]".to_string()];
    walk_mapping(tree.root(), 0, &mut lines);
    lines.truncate(SUMMARY_MAX_LINES);
    lines.join("\n")
}

fn walk_mapping(mapping: &Mapping, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for (key, value) in mapping {
        let Some(key) = scalar_text(key) else { continue };
        if SKIPPED_SECTIONS.contains(&key.as_str()) {
            continue;
        }
        lines.push(format!("{indent}{key}:"));
        walk(value, depth + 1, lines);
    }
}

fn walk(value: &Value, depth: usize, lines: &mut Vec<String>) {
    match value {
        Value::Mapping(m) => walk_mapping(m, depth, lines),
        Value::Sequence(items) => {
            let indent = "  ".repeat(depth);
            for item in items {
                let Some(name) = item.get("name").and_then(scalar_text) else {
                    continue;
                };
                match item.get("status").and_then(scalar_text) {
                    Some(status) if !status.is_empty() => {
                        lines.push(format!("{indent}- {name} ({status})"))
                    }
                    _ => lines.push(format!("{indent}- {name}")),
                }
            }
        }
        _ => {}
    }
}
