//! Button Resolution
//!
//! Turns button descriptor files into [`ButtonEntry`] values. Every
//! descriptor's text is fetched at once and each result is attached as soon
//! as it arrives: to a node, its `Header` child, or a post of its grandparent
//! depending on the descriptor's parent folder.

use crate::assets::CancellationScope;
use crate::naming;
use crate::source::TextSource;
use crate::tree::{ButtonEntry, ContentTree};
use crate::types::NodeId;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome counts of one [`ButtonResolver::resolve`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub attached: usize,
    pub failed: usize,
    /// Descriptors already handled by this resolver
    pub skipped_duplicates: usize,
    /// Fetched, but no post or `Header` folder to attach to
    pub unmatched: usize,
}

/// Where a resolved button ends up
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target<'a> {
    Node(NodeId),
    Post { node: NodeId, number: u32 },
    /// The `Header` folder named `folder` below `node`
    Header { node: NodeId, folder: &'a str },
}

/// Resolves button descriptors against one content tree.
///
/// Remembers every descriptor it has claimed, so resolving the same
/// descriptor again never duplicates its button. Create a new resolver for
/// each rebuilt tree.
pub struct ButtonResolver {
    source: Arc<dyn TextSource>,
    claimed: Mutex<HashSet<String>>,
    scope: Option<CancellationScope>,
}

impl ButtonResolver {
    pub fn new(source: Arc<dyn TextSource>) -> Self {
        Self {
            source,
            claimed: Mutex::new(HashSet::new()),
            scope: None,
        }
    }

    /// Stop attaching once `scope` is cancelled.
    ///
    /// The check happens under the tree write lock, so a tree swapped in by
    /// whoever cancelled the scope never receives a stale button.
    pub fn with_scope(mut self, scope: CancellationScope) -> Self {
        self.scope = Some(scope);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.scope.as_ref().map(|s| s.is_cancelled()).unwrap_or(false)
    }

    pub fn is_resolved(&self, descriptor: &str) -> bool {
        self.claimed.lock().contains(descriptor)
    }

    /// Fetch all descriptors concurrently and attach each button as its
    /// fetch completes.
    ///
    /// The tree lock is only taken for attachment, never across a fetch.
    pub async fn resolve(
        &self,
        tree: &RwLock<ContentTree>,
        descriptors: &[String],
    ) -> ResolveReport {
        let mut report = ResolveReport::default();

        let fresh: Vec<&String> = {
            let mut claimed = self.claimed.lock();
            descriptors
                .iter()
                .filter(|path| {
                    let new = claimed.insert((*path).clone());
                    if !new {
                        report.skipped_duplicates += 1;
                    }
                    new
                })
                .collect()
        };
        if fresh.is_empty() {
            return report;
        }
        debug!(count = fresh.len(), "Fetching button descriptors");

        let mut pending: FuturesUnordered<_> = fresh
            .iter()
            .map(|path| async move {
                let result = self.source.fetch_text(path).await;
                (*path, result)
            })
            .collect();

        while let Some((path, result)) = pending.next().await {
            let url = match result {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    warn!(descriptor = %path, error = %e, "Failed to load button");
                    self.claimed.lock().remove(path.as_str());
                    report.failed += 1;
                    continue;
                }
            };

            let file_name = path.rsplit('/').next().unwrap_or(path.as_str());
            let (display_name, order) = naming::parse_button_name(file_name);
            let button = ButtonEntry {
                display_name,
                url,
                order,
            };

            let attached = {
                let mut guard = tree.write();
                if self.is_cancelled() {
                    debug!("Tree replaced while resolving buttons; dropping results");
                    break;
                }
                attach(&mut guard, path, button)
            };
            if attached {
                report.attached += 1;
            } else {
                warn!(descriptor = %path, "No target for button");
                report.unmatched += 1;
            }
        }

        info!(
            attached = report.attached,
            failed = report.failed,
            unmatched = report.unmatched,
            skipped = report.skipped_duplicates,
            "Resolved buttons"
        );
        report
    }
}

fn locate<'a>(tree: &ContentTree, descriptor: &'a str) -> Option<Target<'a>> {
    let segments: Vec<&str> = descriptor.split('/').collect();
    let folders = &segments[..segments.len().saturating_sub(1)];
    let Some((parent, above)) = folders.split_last() else {
        return Some(Target::Node(tree.root()));
    };

    if naming::is_post_folder(parent) {
        let node = tree.walk_existing(above.iter().copied());
        let number = naming::post_number(parent)?;
        return Some(Target::Post { node, number });
    }
    if naming::is_header_folder(parent) {
        let node = tree.walk_existing(above.iter().copied());
        return Some(Target::Header { node, folder: parent });
    }
    Some(Target::Node(tree.walk_existing(folders.iter().copied())))
}

/// Attach `button` for `descriptor`; false when the target does not exist
fn attach(tree: &mut ContentTree, descriptor: &str, button: ButtonEntry) -> bool {
    match locate(tree, descriptor) {
        Some(Target::Node(id)) => {
            tree.node_mut(id).buttons.push(button);
            true
        }
        Some(Target::Post { node, number }) => match tree.find_post(node, number) {
            Some(post) => tree
                .post_mut(post)
                .map(|entry| entry.buttons.push(button))
                .is_some(),
            None => false,
        },
        Some(Target::Header { node, folder }) => {
            match tree.node(node).child(folder) {
                Some(id) => {
                    tree.node_mut(id).buttons.push(button);
                    true
                }
                None => false,
            }
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use crate::tree::{aggregate_posts, TreeBuilder};
    use crate::types::ORDER_UNSET;
    use std::time::Duration;

    fn setup(
        source: StaticSource,
        paths: &[&str],
    ) -> (Arc<StaticSource>, RwLock<ContentTree>, Vec<String>) {
        let built = TreeBuilder::new().build(paths);
        let mut tree = built.tree;
        aggregate_posts(&mut tree);
        (Arc::new(source), RwLock::new(tree), built.button_descriptors)
    }

    #[tokio::test]
    async fn test_attaches_to_node_header_and_post() {
        let paths = [
            "A/1.Button Discord #336699.txt",
            "B/Header/Button Home.txt",
            "B/Header/logo.png",
            "B/Post.2 Sale/y.png",
            "B/Post.2 Sale/Button Buy.txt",
        ];
        let source = StaticSource::new()
            .with_text("A/1.Button Discord #336699.txt", "https://discord.gg/x\n")
            .with_text("B/Header/Button Home.txt", " https://home ")
            .with_text("B/Post.2 Sale/Button Buy.txt", "https://shop");
        let (source, tree, descriptors) = setup(source, &paths);
        assert_eq!(descriptors.len(), 3);

        let resolver = ButtonResolver::new(source);
        let report = resolver.resolve(&tree, &descriptors).await;
        assert_eq!(report.attached, 3);
        assert_eq!(report.failed, 0);

        let tree = tree.read();
        let a = tree.find_path("A").unwrap();
        assert_eq!(
            tree.node(a).buttons,
            vec![ButtonEntry {
                display_name: "Discord".into(),
                url: "https://discord.gg/x".into(),
                order: 1,
            }]
        );

        let header = tree.find_path("B/Header").unwrap();
        assert_eq!(tree.node(header).buttons[0].url, "https://home");

        let b = tree.find_path("B").unwrap();
        let post = &tree.node(b).posts[0];
        assert_eq!(post.number, 2);
        assert_eq!(post.buttons.len(), 1);
        assert_eq!(post.buttons[0].display_name, "Buy");
        assert_eq!(post.buttons[0].order, ORDER_UNSET);
        assert!(tree.node(b).buttons.is_empty());
    }

    #[tokio::test]
    async fn test_resolving_twice_does_not_duplicate() {
        let paths = ["A/Button Go.txt", "A/x.png"];
        let source = StaticSource::new().with_text("A/Button Go.txt", "https://go");
        let (source, tree, descriptors) = setup(source, &paths);

        let resolver = ButtonResolver::new(source);
        resolver.resolve(&tree, &descriptors).await;
        let again = resolver.resolve(&tree, &descriptors).await;

        assert_eq!(again.skipped_duplicates, 1);
        assert_eq!(again.attached, 0);
        let a = tree.read().find_path("A").unwrap();
        assert_eq!(tree.read().node(a).buttons.len(), 1);
        assert!(resolver.is_resolved("A/Button Go.txt"));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_button_absent() {
        let paths = ["A/Button Gone.txt", "A/x.png"];
        let (source, tree, descriptors) = setup(StaticSource::new(), &paths);

        let resolver = ButtonResolver::new(source);
        let report = resolver.resolve(&tree, &descriptors).await;
        assert_eq!(report.failed, 1);
        assert!(!resolver.is_resolved("A/Button Gone.txt"));

        let a = tree.read().find_path("A").unwrap();
        assert!(tree.read().node(a).buttons.is_empty());
    }

    #[tokio::test]
    async fn test_first_matching_post_wins() {
        let paths = [
            "B/Post.2 First/a.png",
            "B/Post.2/b.png",
            "B/Post.2 First/Button Buy.txt",
            "B/Post.9/Button Lost.txt",
        ];
        let source = StaticSource::new()
            .with_text("B/Post.2 First/Button Buy.txt", "https://buy")
            .with_text("B/Post.9/Button Lost.txt", "https://lost");
        let (source, tree, descriptors) = setup(source, &paths);

        let report = ButtonResolver::new(source).resolve(&tree, &descriptors).await;
        let tree = tree.read();
        let b = tree.find_path("B").unwrap();
        let posts = &tree.node(b).posts;
        let with_buttons: Vec<_> = posts.iter().filter(|p| !p.buttons.is_empty()).collect();
        assert_eq!(with_buttons.len(), 1);
        assert_eq!(with_buttons[0].number, 2);
        assert!(std::ptr::eq(with_buttons[0], &posts[0]));
        // Post.9 had no images but still became an entry, so its button lands there
        assert_eq!(report.attached, 2);
        assert_eq!(report.unmatched, 0);
    }

    #[tokio::test]
    async fn test_cancelled_scope_attaches_nothing() {
        let paths = ["A/Button Go.txt", "A/x.png"];
        let source = StaticSource::new().with_text("A/Button Go.txt", "https://go");
        let (source, tree, descriptors) = setup(source, &paths);

        let scope = CancellationScope::new();
        scope.cancel();
        let report = ButtonResolver::new(source)
            .with_scope(scope)
            .resolve(&tree, &descriptors)
            .await;
        assert_eq!(report.attached, 0);
        let a = tree.read().find_path("A").unwrap();
        assert!(tree.read().node(a).buttons.is_empty());
    }

    #[tokio::test]
    async fn test_header_without_folder_is_unmatched() {
        let tree = RwLock::new(ContentTree::new());
        let source = Arc::new(StaticSource::new().with_text("C/Header/Button X.txt", "https://x"));
        let report = ButtonResolver::new(source)
            .resolve(&tree, &["C/Header/Button X.txt".to_string()])
            .await;
        assert_eq!(report.unmatched, 1);
        let tree = tree.read();
        assert!(tree.node(tree.root()).buttons.is_empty());
    }

    #[tokio::test]
    async fn test_header_button_stays_in_its_own_folder() {
        let paths = [
            "B/Header/Button Home.txt",
            "B/Header/h.png",
            "B/HEADER/z.png",
        ];
        let source = StaticSource::new().with_text("B/Header/Button Home.txt", "https://home");
        let (source, tree, descriptors) = setup(source, &paths);

        let report = ButtonResolver::new(source).resolve(&tree, &descriptors).await;
        assert_eq!(report.attached, 1);

        let tree = tree.read();
        let header = tree.find_path("B/Header").unwrap();
        let shouting = tree.find_path("B/HEADER").unwrap();
        assert_eq!(tree.node(header).buttons.len(), 1);
        assert!(tree.node(shouting).buttons.is_empty());
    }

    #[tokio::test]
    async fn test_slow_descriptor_does_not_hold_back_others() {
        let paths = ["A/Button Fast.txt", "A/Button Slow.txt", "A/x.png"];
        let source = StaticSource::new()
            .with_text("A/Button Fast.txt", "https://fast")
            .with_text("A/Button Slow.txt", "https://slow")
            .with_slow_path("A/Button Slow.txt", Duration::from_millis(300));
        let (source, tree, descriptors) = setup(source, &paths);
        let resolver = ButtonResolver::new(source);

        let check = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let tree = tree.read();
            let a = tree.find_path("A").unwrap();
            tree.node(a)
                .buttons
                .iter()
                .map(|b| b.display_name.clone())
                .collect::<Vec<_>>()
        };
        let (report, early) = tokio::join!(resolver.resolve(&tree, &descriptors), check);

        assert_eq!(early, vec!["Fast".to_string()]);
        assert_eq!(report.attached, 2);
    }
}
