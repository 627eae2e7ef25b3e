//! Tree construction from a flat path listing
//!
//! Directories are implicit in the listing: every non-final segment becomes a
//! folder node, and the final segment is classified by name alone.

use crate::naming;
use crate::tree::node::ContentTree;
use tracing::debug;

/// Listing prefix excluded by default (the tool's own packaging folder)
pub const DEFAULT_EXCLUDE_PREFIX: &str = "WindowFiles/";

/// Output of one build: the tree plus button descriptors awaiting resolution
#[derive(Debug, Clone, Default)]
pub struct BuiltTree {
    pub tree: ContentTree,
    pub button_descriptors: Vec<String>,
}

/// Builds a [`ContentTree`] from repository-relative paths
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    exclude_prefix: Option<String>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            exclude_prefix: Some(DEFAULT_EXCLUDE_PREFIX.to_string()),
        }
    }

    /// Skip paths starting with `prefix` (case-insensitive); `None` keeps everything
    pub fn with_exclude_prefix(mut self, prefix: Option<String>) -> Self {
        self.exclude_prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    fn is_excluded(&self, path: &str) -> bool {
        match &self.exclude_prefix {
            Some(prefix) => path
                .get(..prefix.len())
                .map(|head| head.eq_ignore_ascii_case(prefix))
                .unwrap_or(false),
            None => false,
        }
    }

    pub fn build<I, S>(&self, paths: I) -> BuiltTree
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = ContentTree::new();
        let mut button_descriptors = Vec::new();
        let mut excluded = 0usize;

        for path in paths {
            let path = path.as_ref();
            if path.is_empty() {
                continue;
            }
            if self.is_excluded(path) {
                excluded += 1;
                continue;
            }

            let mut segments = path.split('/').peekable();
            let mut current = tree.root();
            while let Some(segment) = segments.next() {
                if segments.peek().is_some() {
                    current = tree.ensure_child(current, segment);
                    continue;
                }

                if naming::is_button_file(segment) {
                    button_descriptors.push(path.to_string());
                } else if naming::is_hidden_marker(segment) {
                    tree.node_mut(current).hidden = true;
                } else if let Some(color) = naming::try_parse_color(naming::file_stem(segment)) {
                    tree.node_mut(current).bg_color = Some(color);
                } else if naming::is_image_file(segment) {
                    tree.node_mut(current).image_paths.push(path.to_string());
                }
            }
        }

        debug!(
            nodes = tree.len(),
            button_descriptors = button_descriptors.len(),
            excluded,
            "Built content tree"
        );

        BuiltTree {
            tree,
            button_descriptors,
        }
    }
}
