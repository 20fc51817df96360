//! Output module for writing crawl results
//!
//! This module handles:
//! - Writing the page tree as nested folders of plaintext files
//! - Rendering an optional Graphviz overview of the tree

mod graph;
mod writer;

pub use graph::{render_graph, write_graph};
pub use writer::{slug, TreeWriter, WriteOutcome, MISSING_PAGE_TEXT};

use crate::config::OutputConfig;
use crate::tree::PageTree;
use crate::DisamError;
use std::path::PathBuf;

/// Writes `tree` as configured, turning a collision into an error
///
/// The graph is only rendered once the text files were written. A failure to
/// write it is logged and otherwise ignored.
pub fn write_output(tree: &PageTree, config: &OutputConfig) -> Result<Vec<PathBuf>, DisamError> {
    let files = match TreeWriter::from_config(config).write(tree)? {
        WriteOutcome::Written { files } => files,
        WriteOutcome::Collision(path) => {
            tracing::error!("Refusing to overwrite {}", path.display());
            return Err(DisamError::FileCollision { path });
        }
    };

    if let Some(graph_path) = &config.graph_path {
        if let Err(e) = write_graph(tree, graph_path) {
            tracing::warn!("Failed to write graph to {}: {}", graph_path.display(), e);
        }
    }

    Ok(files)
}
