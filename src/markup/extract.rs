//! Plain text and link extraction
//!
//! Walks a parsed [`Document`] in pre-order, emitting text verbatim, a
//! `== heading ==` line for every section, and one [`Link`] per article link.

use crate::markup::parser::{Document, Node};

/// Section headings whose bodies are left out of the extracted text
pub const SUPPRESSED_SECTIONS: &[&str] = &[
    "See also",
    "References",
    "Further reading",
    "External links",
    "Footnotes",
    "Notes",
    "Other",
    "Other uses",
];

/// A link as it appears in an article
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    /// Display text of the link
    pub name: String,

    /// Title the link points at (may be `Article#Section` or `#Section`)
    pub target: String,
}

impl Link {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// Output of [`extract`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub plain_text: String,
    pub links: Vec<Link>,
}

/// Extracts plain text and links from `document`
///
/// Bodies of sections whose heading is in `suppressed` are replaced by a single
/// newline. Tables, images, category and namespace links and raw tags are skipped
/// with their whole subtree. Leading spaces and newlines are trimmed from the text.
pub fn extract(document: &Document, suppressed: &[&str]) -> Extracted {
    let mut text = String::new();
    let mut links = Vec::new();
    for node in &document.children {
        walk(node, suppressed, &mut text, &mut links);
    }

    Extracted {
        plain_text: text.trim_start_matches([' ', '\n']).to_string(),
        links,
    }
}

/// Parses `raw` and extracts it with the default suppressed sections
pub fn extract_wikitext(raw: &str) -> Extracted {
    extract(&crate::markup::parse(raw), SUPPRESSED_SECTIONS)
}

fn walk(node: &Node, suppressed: &[&str], text: &mut String, links: &mut Vec<Link>) {
    match node {
        Node::Text(content) => text.push_str(content),
        Node::Section(section) => {
            let marks = "=".repeat(section.level);
            text.push_str(&format!("{} {} {}", marks, section.heading, marks));
            if suppressed.contains(&section.heading.as_str()) {
                text.push('\n');
                return;
            }
            for child in &section.children {
                walk(child, suppressed, text, links);
            }
        }
        Node::ArticleLink(link) if link.children.is_empty() => {
            text.push_str(&link.target);
            links.push(Link::new(link.target.clone(), link.target.clone()));
        }
        Node::ArticleLink(link) => {
            let name: String = link
                .children
                .iter()
                .filter_map(|child| match child {
                    Node::Text(content) => Some(content.as_str()),
                    _ => None,
                })
                .collect();
            links.push(Link::new(name, link.target.clone()));
            for child in &link.children {
                walk(child, suppressed, text, links);
            }
        }
        Node::ImageLink(_)
        | Node::CategoryLink(_)
        | Node::NamespaceLink(_)
        | Node::Table(_)
        | Node::Tag(_) => {}
    }
}
