//! Wikitext handling
//!
//! - [`parse`] turns raw wikitext into a [`Document`] tree
//! - [`extract`] walks the tree and produces plain text plus the ordered list of
//!   article links

mod extract;
mod parser;

pub use extract::{extract, extract_wikitext, Extracted, Link, SUPPRESSED_SECTIONS};
pub use parser::{parse, parse_inline, plain_text, ArticleLink, Document, Node, Section, Tag};
