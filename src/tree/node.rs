//! Content node types and the node arena

use crate::types::{NodeId, PostId, Rgba};
use std::collections::BTreeMap;

/// A clickable link resolved from a button descriptor file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEntry {
    pub display_name: String,
    pub url: String,
    /// Explicit sort priority; `ORDER_UNSET` sorts last
    pub order: i32,
}

/// A `Post.N` folder flattened into its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntry {
    pub number: u32,
    pub title: String,
    pub image_paths: Vec<String>,
    pub buttons: Vec<ButtonEntry>,
}

/// Folder node representation
#[derive(Debug, Clone)]
pub struct ContentNode {
    /// Raw segment as it appeared in the listing, prefixes included
    pub name: String,
    /// Slash-joined path from the root; empty for the root itself
    pub path: String,
    pub parent: Option<NodeId>,
    pub children: BTreeMap<String, NodeId>,
    pub image_paths: Vec<String>,
    pub hidden: bool,
    pub bg_color: Option<Rgba>,
    pub posts: Vec<PostEntry>,
    pub buttons: Vec<ButtonEntry>,
}

impl ContentNode {
    fn new(name: String, path: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            path,
            parent,
            children: BTreeMap::new(),
            image_paths: Vec::new(),
            hidden: false,
            bg_color: None,
            posts: Vec::new(),
            buttons: Vec::new(),
        }
    }

    pub fn has_color(&self) -> bool {
        self.bg_color.is_some()
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena holding every folder node of one content tree.
///
/// Nodes refer to each other by [`NodeId`]; parent links are plain indices so
/// the graph never owns itself. Detached nodes (absorbed post folders) keep
/// their slot but are unreachable from the root.
#[derive(Debug, Clone)]
pub struct ContentTree {
    nodes: Vec<ContentNode>,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![ContentNode::new("root".to_string(), String::new(), None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &ContentNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ContentNode {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&ContentNode> {
        self.nodes.get(id.0)
    }

    /// Child named `name` under `parent`, created if absent
    pub fn ensure_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(existing) = self.nodes[parent.0].child(name) {
            return existing;
        }
        let parent_path = &self.nodes[parent.0].path;
        let path = if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent_path, name)
        };
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(ContentNode::new(name.to_string(), path, Some(parent)));
        self.nodes[parent.0].children.insert(name.to_string(), id);
        id
    }

    /// Unlink a child from its parent's navigation map
    pub fn detach_child(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0].children.remove(name)
    }

    /// Deepest node reachable by following `segments` from the root.
    ///
    /// Stops at the first missing segment and returns the node reached so far.
    pub fn walk_existing<'a, I>(&self, segments: I) -> NodeId
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self.root();
        for segment in segments {
            match self.node(current).child(segment) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Exact lookup of a slash-joined path; `""` is the root
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        let mut current = self.root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.node(current).child(segment)?;
        }
        Some(current)
    }

    pub fn post(&self, id: PostId) -> Option<&PostEntry> {
        self.nodes.get(id.node.0)?.posts.get(id.index)
    }

    pub fn post_mut(&mut self, id: PostId) -> Option<&mut PostEntry> {
        self.nodes.get_mut(id.node.0)?.posts.get_mut(id.index)
    }

    /// First post on `node` carrying `number`
    pub fn find_post(&self, node: NodeId, number: u32) -> Option<PostId> {
        self.node(node)
            .posts
            .iter()
            .position(|p| p.number == number)
            .map(|index| PostId { node, index })
    }

    /// Ids of every node reachable from the root, depth first in key order
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.node(id).children.values().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Number of nodes reachable from the root, root included
    pub fn len(&self) -> usize {
        self.reachable().len()
    }

    pub fn is_empty(&self) -> bool {
        self.node(self.root()).children.is_empty()
    }
}
