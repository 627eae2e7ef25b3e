//! Post aggregation
//!
//! Flattens `Post.N Title` folders into [`PostEntry`] records on their parent.
//! Post folders never survive as navigable children; hidden ones vanish
//! without leaving a post behind.

use crate::naming;
use crate::tree::node::{ContentTree, PostEntry};
use crate::types::NodeId;
use tracing::{debug, trace};

/// Absorb every post folder in the tree into its parent's `posts`.
///
/// Returns the number of posts created.
pub fn aggregate_posts(tree: &mut ContentTree) -> usize {
    let mut created = 0;
    let mut pending = vec![tree.root()];
    while let Some(id) = pending.pop() {
        created += absorb_post_children(tree, id);
        pending.extend(tree.node(id).children.values().copied());
    }
    debug!(posts = created, "Aggregated post folders");
    created
}

fn absorb_post_children(tree: &mut ContentTree, id: NodeId) -> usize {
    let post_children: Vec<(String, NodeId)> = tree
        .node(id)
        .children
        .iter()
        .filter(|(name, _)| naming::is_post_folder(name))
        .map(|(name, child)| (name.clone(), *child))
        .collect();

    let mut created = 0;
    for (name, child_id) in post_children {
        tree.detach_child(id, &name);

        let child = tree.node(child_id);
        if child.hidden {
            trace!(folder = %child.path, "Dropping hidden post folder");
            continue;
        }
        let Some((number, title)) = naming::parse_post_folder(&name) else {
            trace!(folder = %child.path, "Post folder name has no parsable title");
            continue;
        };

        let post = PostEntry {
            number,
            title,
            image_paths: child.image_paths.clone(),
            buttons: child.buttons.clone(),
        };
        tree.node_mut(id).posts.push(post);
        created += 1;
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::builder::TreeBuilder;

    fn built(paths: &[&str]) -> ContentTree {
        let mut tree = TreeBuilder::new().build(paths.iter().copied()).tree;
        aggregate_posts(&mut tree);
        tree
    }

    #[test]
    fn test_post_folder_becomes_entry() {
        let tree = built(&["B/Post.2 Sale/y.png", "B/Post.2 Sale/z.png", "B/Post.5/w.png"]);
        let b = tree.find_path("B").unwrap();
        let node = tree.node(b);
        assert!(node.children.is_empty());
        assert_eq!(node.posts.len(), 2);

        let sale = node.posts.iter().find(|p| p.number == 2).unwrap();
        assert_eq!(sale.title, "Sale");
        assert_eq!(sale.image_paths, vec!["B/Post.2 Sale/y.png", "B/Post.2 Sale/z.png"]);

        let five = node.posts.iter().find(|p| p.number == 5).unwrap();
        assert_eq!(five.title, "Post 5");
    }

    #[test]
    fn test_hidden_post_is_dropped_entirely() {
        let tree = built(&["B/Post.1 Secret/y.png", "B/Post.1 Secret/Hide.txt"]);
        let b = tree.find_path("B").unwrap();
        assert!(tree.node(b).children.is_empty());
        assert!(tree.node(b).posts.is_empty());
    }

    #[test]
    fn test_post_subfolders_are_not_traversed() {
        let tree = built(&["B/Post.1/Inner/Post.2/a.png", "B/Post.1/b.png"]);
        let b = tree.find_path("B").unwrap();
        assert_eq!(tree.node(b).posts.len(), 1);
        assert_eq!(tree.node(b).posts[0].image_paths, vec!["B/Post.1/b.png"]);
        assert!(tree.find_path("B/Post.1").is_none());
    }

    #[test]
    fn test_nested_posts_under_regular_folders() {
        let tree = built(&["A/Header/Post.3 News/n.png", "A/C/Post.4/m.png"]);
        let header = tree.find_path("A/Header").unwrap();
        let c = tree.find_path("A/C").unwrap();
        assert_eq!(tree.node(header).posts[0].number, 3);
        assert_eq!(tree.node(c).posts[0].number, 4);
    }

    #[test]
    fn test_duplicate_numbers_are_kept() {
        let tree = built(&["B/Post.1 One/a.png", "B/Post.1 Uno/b.png"]);
        let b = tree.find_path("B").unwrap();
        assert_eq!(tree.node(b).posts.len(), 2);
    }

    #[test]
    fn test_no_post_folder_survives() {
        let tree = built(&["X/Post.9-draft/a.png", "X/Y/Post.1/b.png", "Post.4/c.png"]);
        for id in tree.reachable() {
            for name in tree.node(id).children.keys() {
                assert!(!naming::is_post_folder(name), "{} survived", name);
            }
        }
        let root = tree.root();
        assert_eq!(tree.node(root).posts.len(), 1);
    }
}
