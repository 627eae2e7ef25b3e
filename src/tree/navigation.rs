//! Navigation queries over a built content tree
//!
//! Everything here is read-only: breadcrumb resolution, sorted child listings
//! and the upward lookups used for header and background color inheritance.

use crate::naming;
use crate::tree::node::{ButtonEntry, ContentTree, PostEntry};
use crate::types::{NodeId, Rgba};
use std::cmp::Ordering;

/// Navigable child of a node, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedChild {
    pub display_name: String,
    pub order: i32,
    pub id: NodeId,
}

/// Ordered raw segment names from the root to the selected node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumb {
    segments: Vec<String>,
}

impl Breadcrumb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Drop everything deeper than `depth` segments
    pub fn truncate(&mut self, depth: usize) {
        self.segments.truncate(depth);
    }

    pub fn to_path(&self) -> String {
        self.segments.join("/")
    }
}

/// Node named by the breadcrumb; any missing segment falls back to the root.
pub fn node_by_breadcrumb(tree: &ContentTree, crumbs: &Breadcrumb) -> NodeId {
    node_at_depth(tree, crumbs, crumbs.len())
}

/// Node `level` segments down the breadcrumb. Level 0 is the root.
pub fn node_at_depth(tree: &ContentTree, crumbs: &Breadcrumb, level: usize) -> NodeId {
    let mut current = tree.root();
    for segment in crumbs.segments().iter().take(level) {
        match tree.node(current).child(segment) {
            Some(next) => current = next,
            None => return tree.root(),
        }
    }
    current
}

/// Children shown in navigation: no `Header`, no hidden folders, no posts.
///
/// Sorted by ordering prefix, then by display name ignoring case.
pub fn sorted_children(tree: &ContentTree, parent: NodeId) -> Vec<SortedChild> {
    collect_sorted(tree, parent, false)
}

/// Like [`sorted_children`] but keeps hidden folders
pub fn sorted_children_with_hidden(tree: &ContentTree, parent: NodeId) -> Vec<SortedChild> {
    collect_sorted(tree, parent, true)
}

fn collect_sorted(tree: &ContentTree, parent: NodeId, keep_hidden: bool) -> Vec<SortedChild> {
    let mut list: Vec<SortedChild> = tree
        .node(parent)
        .children
        .iter()
        .filter(|(name, id)| {
            !naming::is_header_folder(name)
                && (keep_hidden || !tree.node(**id).hidden)
                && !naming::is_post_folder(name)
        })
        .map(|(name, id)| {
            let (order, display) = naming::parse_order_and_name(name);
            SortedChild {
                display_name: display.to_string(),
                order,
                id: *id,
            }
        })
        .collect();
    list.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| cmp_ignore_case(&a.display_name, &b.display_name))
    });
    list
}

/// First visible, non-header child by raw key order.
pub fn first_visible_child(tree: &ContentTree, parent: NodeId) -> Option<NodeId> {
    tree.node(parent)
        .children
        .iter()
        .find(|(name, id)| !naming::is_header_folder(name) && !tree.node(**id).hidden)
        .map(|(_, id)| *id)
}

/// Default landing node after a refresh: the first visible top-level folder.
pub fn default_top_level(tree: &ContentTree) -> Option<NodeId> {
    first_visible_child(tree, tree.root())
}

/// From a folder without images, keep stepping into the first visible child
/// until reaching one with images or running out of candidates.
pub fn auto_descend(tree: &ContentTree, start: NodeId) -> NodeId {
    let start_node = tree.node(start);
    if !start_node.image_paths.is_empty() || start_node.is_leaf() {
        return start;
    }
    let mut current = start;
    while tree.node(current).image_paths.is_empty() {
        let Some(next) = first_visible_child(tree, current) else {
            break;
        };
        current = next;
        let node = tree.node(current);
        if node.is_leaf() && node.image_paths.is_empty() {
            break;
        }
    }
    current
}

/// Closest node on the path to the root (inclusive) that declares a color.
pub fn nearest_color(tree: &ContentTree, start: NodeId) -> Option<Rgba> {
    ancestors(tree, start).find_map(|id| tree.node(id).bg_color)
}

/// Closest `Header` child found walking from `start` up to the root.
pub fn nearest_header(tree: &ContentTree, start: NodeId) -> Option<NodeId> {
    ancestors(tree, start).find_map(|id| {
        tree.node(id)
            .children
            .iter()
            .find(|(name, _)| name.as_str() == naming::HEADER_FOLDER)
            .map(|(_, header)| *header)
    })
}

/// Header child of `node`, if present and neither it nor `node` is hidden.
pub fn visible_header(tree: &ContentTree, node: NodeId) -> Option<NodeId> {
    let parent = tree.node(node);
    if parent.hidden {
        return None;
    }
    parent
        .child(naming::HEADER_FOLDER)
        .filter(|header| !tree.node(*header).hidden)
}

/// Display name of a node, ordering prefix removed
pub fn display_name_of(tree: &ContentTree, id: NodeId) -> &str {
    naming::display_name(&tree.node(id).name)
}

/// Top-level folder containing `node`, or `None` for the root itself.
pub fn top_level_of(tree: &ContentTree, node: NodeId) -> Option<NodeId> {
    let root = tree.root();
    ancestors(tree, node)
        .take_while(|id| *id != root)
        .last()
}

/// `start` followed by each of its ancestors up to the root
pub fn ancestors(tree: &ContentTree, start: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(Some(start), move |id| tree.node(*id).parent)
}

/// Buttons in display order: explicit order first, then name.
pub fn sorted_buttons(buttons: &[ButtonEntry]) -> Vec<&ButtonEntry> {
    let mut sorted: Vec<&ButtonEntry> = buttons.iter().collect();
    sorted.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    sorted
}

/// Posts newest first (highest number first)
pub fn posts_newest_first(posts: &[PostEntry]) -> Vec<&PostEntry> {
    let mut sorted: Vec<&PostEntry> = posts.iter().collect();
    sorted.sort_by(|a, b| b.number.cmp(&a.number));
    sorted
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
