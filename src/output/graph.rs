//! Graphviz rendering of a finished crawl
//!
//! One node per distinct title and one labelled edge per child entry. Titles that
//! were fetched more than once (under different parents) are filled orange.

use crate::tree::PageTree;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

const DUPLICATE_FILL: &str = "orange";

/// Renders `tree` as a DOT digraph
pub fn render_graph(tree: &PageTree, generated_at: DateTime<Utc>) -> String {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for id in tree.ids() {
        *occurrences.entry(tree.get(id).display_title()).or_default() += 1;
    }

    let mut dot = String::new();
    dot.push_str(&format!(
        "// Generated by disamwiki on {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    dot.push_str("digraph disamwiki {\n");
    dot.push_str("    node [shape=box];\n");

    let mut declared = HashSet::new();
    for id in tree.ids() {
        let title = tree.get(id).display_title();
        if !declared.insert(title) {
            continue;
        }
        if occurrences.get(title).copied().unwrap_or(0) > 1 {
            dot.push_str(&format!(
                "    {} [style=filled, fillcolor={}];\n",
                quote(title),
                DUPLICATE_FILL
            ));
        } else {
            dot.push_str(&format!("    {};\n", quote(title)));
        }
    }

    for id in tree.ids() {
        let parent = tree.get(id);
        for group in &parent.children {
            for &child in &group.pages {
                dot.push_str(&format!(
                    "    {} -> {} [label={}];\n",
                    quote(parent.display_title()),
                    quote(tree.get(child).display_title()),
                    quote(&group.link_name)
                ));
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Writes the DOT rendering of `tree` to `path`
pub fn write_graph(tree: &PageTree, path: &Path) -> io::Result<()> {
    fs::write(path, render_graph(tree, Utc::now()))?;
    tracing::info!("Wrote graph of {} pages to {}", tree.len(), path.display());
    Ok(())
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
