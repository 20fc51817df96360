//! Directory tree writer
//!
//! Serializes a [`PageTree`] depth-first into nested folders of plaintext files:
//!
//! ```text
//! <dir>/Mercury_(disambiguation)/Mercury_(disambiguation).txt
//! <dir>/Mercury_(disambiguation)/the_planet/Mercury_(planet).txt
//! <dir>/Mercury_(disambiguation)/the_planet/Sun/Sun.txt
//! ```
//!
//! A link name used more than once under the same parent gets `_2`, `_3`, ...
//! folders for its later entries.

use crate::config::OutputConfig;
use crate::tree::{PageId, PageTree};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Contents written for a page that does not exist
pub const MISSING_PAGE_TEXT: &str = "DOES NOT EXIST";

/// Result of [`TreeWriter::write`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every file was written, in write order
    Written { files: Vec<PathBuf> },
    /// `path` already existed; files written before it are left in place
    Collision(PathBuf),
}

/// File-system safe form of a title or link name
pub fn slug(name: &str) -> String {
    name.replace(' ', "_").replace('/', "-")
}

/// Writes a page tree under one output directory
#[derive(Debug, Clone)]
pub struct TreeWriter {
    root_dir: PathBuf,
    overwrite: bool,
}

impl TreeWriter {
    pub fn new(root_dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            root_dir: root_dir.into(),
            overwrite,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.directory, config.overwrite)
    }

    /// Writes `tree`, stopping at the first existing file unless overwriting
    ///
    /// An empty tree writes nothing.
    pub fn write(&self, tree: &PageTree) -> io::Result<WriteOutcome> {
        let mut files = Vec::new();
        let Some(root) = tree.root() else {
            return Ok(WriteOutcome::Written { files });
        };

        let folder = self.root_dir.join(slug(tree.get(root).display_title()));
        if let Some(path) = self.write_page(tree, root, &folder, &mut files)? {
            return Ok(WriteOutcome::Collision(path));
        }

        tracing::info!(
            "Wrote {} files under {}",
            files.len(),
            self.root_dir.display()
        );
        Ok(WriteOutcome::Written { files })
    }

    /// Writes `id` into `folder` and recurses into its children
    ///
    /// Returns the colliding path, if any.
    fn write_page(
        &self,
        tree: &PageTree,
        id: PageId,
        folder: &Path,
        files: &mut Vec<PathBuf>,
    ) -> io::Result<Option<PathBuf>> {
        let page = tree.get(id);
        fs::create_dir_all(folder)?;

        let file = folder.join(format!("{}.txt", slug(page.display_title())));
        let contents = if page.is_missing() {
            MISSING_PAGE_TEXT
        } else {
            page.plain_text.as_deref().unwrap_or_default()
        };
        if file.exists() && !self.overwrite {
            return Ok(Some(file));
        }
        fs::write(&file, contents)?;
        tracing::debug!("Wrote {}", file.display());
        files.push(file);

        if page.is_missing() {
            return Ok(None);
        }

        for group in &page.children {
            let name = slug(&group.link_name);
            for (i, &child) in group.pages.iter().enumerate() {
                let child_folder = match i {
                    0 => folder.join(&name),
                    _ => folder.join(format!("{}_{}", name, i + 1)),
                };
                if let Some(path) = self.write_page(tree, child, &child_folder, files)? {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Link;
    use crate::tree::Page;
    use crate::wiki::ResolutionRecord;
    use tempfile::TempDir;

    fn found(tree: &mut PageTree, id: i64, title: &str, text: &str) -> PageId {
        let page = tree.insert(Page::from_record(ResolutionRecord {
            search_title: title.to_string(),
            title: title.to_string(),
            page_id: id,
            content: Some(text.to_string()),
            to_fragment: None,
        }));
        tree.set_parsed(page, text.to_string(), Vec::<Link>::new());
        page
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Root with a planet child (which has a child), an aliased element page and a
    /// missing page
    fn sample_tree() -> PageTree {
        let mut tree = PageTree::new();
        let root = found(&mut tree, 1, "Mercury (disambiguation)", "Mercury may refer to");
        let planet = found(&mut tree, 2, "Mercury (planet)", "A planet");
        tree.attach(root, planet, &names(&["the planet"]));
        let sun = found(&mut tree, 3, "Sun", "A star");
        tree.attach(planet, sun, &names(&["Sun"]));
        let element = found(&mut tree, 4, "Mercury (element)", "A metal/liquid");
        tree.attach(root, element, &names(&["element", "element"]));
        let missing = tree.insert(Page::from_record(ResolutionRecord::missing(
            "Vulcan", "Vulcan",
        )));
        tree.attach(root, missing, &names(&["Vulcan"]));
        tree
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("AC/DC (band)"), "AC-DC_(band)");
        assert_eq!(slug("Plain"), "Plain");
    }

    #[test]
    fn test_writes_nested_folders() {
        let dir = TempDir::new().unwrap();
        let writer = TreeWriter::new(dir.path(), false);

        let outcome = writer.write(&sample_tree()).unwrap();

        let base = dir.path().join("Mercury_(disambiguation)");
        assert_eq!(
            read(base.join("Mercury_(disambiguation).txt")),
            "Mercury may refer to"
        );
        assert_eq!(
            read(base.join("the_planet").join("Mercury_(planet).txt")),
            "A planet"
        );
        assert_eq!(
            read(base.join("the_planet").join("Sun").join("Sun.txt")),
            "A star"
        );
        assert_eq!(
            read(base.join("element").join("Mercury_(element).txt")),
            "A metal/liquid"
        );
        assert_eq!(
            read(base.join("element_2").join("Mercury_(element).txt")),
            "A metal/liquid"
        );
        assert_eq!(
            read(base.join("Vulcan").join("Vulcan.txt")),
            MISSING_PAGE_TEXT
        );

        match outcome {
            WriteOutcome::Written { files } => assert_eq!(files.len(), 6),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_collision_without_overwrite() {
        let dir = TempDir::new().unwrap();
        let writer = TreeWriter::new(dir.path(), false);
        let tree = sample_tree();

        writer.write(&tree).unwrap();
        let outcome = writer.write(&tree).unwrap();

        let expected = dir
            .path()
            .join("Mercury_(disambiguation)")
            .join("Mercury_(disambiguation).txt");
        assert_eq!(outcome, WriteOutcome::Collision(expected));
    }

    #[test]
    fn test_collision_leaves_earlier_files() {
        let dir = TempDir::new().unwrap();
        let sun_folder = dir
            .path()
            .join("Mercury_(disambiguation)")
            .join("the_planet")
            .join("Sun");
        fs::create_dir_all(&sun_folder).unwrap();
        fs::write(sun_folder.join("Sun.txt"), "old").unwrap();

        let outcome = TreeWriter::new(dir.path(), false)
            .write(&sample_tree())
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Collision(sun_folder.join("Sun.txt")));
        assert_eq!(read(sun_folder.join("Sun.txt")), "old");
        assert!(dir
            .path()
            .join("Mercury_(disambiguation)")
            .join("the_planet")
            .join("Mercury_(planet).txt")
            .exists());
        assert!(!dir
            .path()
            .join("Mercury_(disambiguation)")
            .join("element")
            .exists());
    }

    #[test]
    fn test_overwrite_replaces_files() {
        let dir = TempDir::new().unwrap();
        let root_folder = dir.path().join("Mercury_(disambiguation)");
        fs::create_dir_all(&root_folder).unwrap();
        fs::write(root_folder.join("Mercury_(disambiguation).txt"), "stale").unwrap();

        let outcome = TreeWriter::new(dir.path(), true)
            .write(&sample_tree())
            .unwrap();

        assert!(matches!(outcome, WriteOutcome::Written { .. }));
        assert_eq!(
            read(root_folder.join("Mercury_(disambiguation).txt")),
            "Mercury may refer to"
        );
    }

    #[test]
    fn test_empty_tree_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let outcome = TreeWriter::new(dir.path(), false)
            .write(&PageTree::new())
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Written { files: Vec::new() });
    }
}
