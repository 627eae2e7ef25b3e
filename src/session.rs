//! Session
//!
//! Owns one content tree for its whole lifetime: refreshes it in the
//! background, tracks the breadcrumb, and routes asset requests through the
//! shared fetch queue.

use crate::assets::{AssetFetchQueue, AssetStatus, CancellationScope, ContentCache};
use crate::buttons::{ButtonResolver, ResolveReport};
use crate::config::BulletinConfig;
use crate::error::ContentError;
use crate::source::{ContentSource, TextSource, TreeSource};
use crate::tree::navigation::{self, Breadcrumb};
use crate::tree::{aggregate_posts, ContentTree, TreeBuilder};
use crate::types::NodeId;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Progress of the most recent refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Loading,
    Ready,
    /// The listing could not be obtained; navigation is blocked until the next refresh
    Failed(ContentError),
    /// A newer refresh took over before this one published its tree.
    /// Only reported by [`RefreshHandle::join`], never broadcast.
    Superseded,
}

impl RefreshState {
    pub fn is_ready(&self) -> bool {
        matches!(self, RefreshState::Ready)
    }
}

/// Handle to a background refresh
pub struct RefreshHandle {
    task: JoinHandle<RefreshState>,
}

impl RefreshHandle {
    /// Wait for the refresh to finish, buttons included.
    ///
    /// Returns the state this refresh reached. A refresh superseded by a
    /// newer one publishes nothing but still reports where it stopped.
    pub async fn join(self) -> RefreshState {
        match self.task.await {
            Ok(state) => state,
            Err(e) => RefreshState::Failed(ContentError::SourceUnavailable(format!(
                "Refresh task ended abnormally: {}",
                e
            ))),
        }
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

struct RefreshContext {
    generation: u64,
    scope: CancellationScope,
    tree: Arc<RwLock<ContentTree>>,
    breadcrumb: Arc<RwLock<Breadcrumb>>,
    state: Arc<watch::Sender<RefreshState>>,
    lister: Arc<dyn TreeSource>,
    texts: Arc<dyn TextSource>,
    builder: TreeBuilder,
}

impl RefreshContext {
    fn is_current(&self) -> bool {
        !self.scope.is_cancelled()
    }

    /// Publish `state` unless a newer refresh took over.
    ///
    /// Checked under the tree lock, which `Session::refresh` only takes after
    /// cancelling the scope.
    fn publish(&self, state: RefreshState) -> bool {
        let _tree = self.tree.read();
        if !self.is_current() {
            return false;
        }
        self.state.send_replace(state);
        true
    }

    async fn run(self) -> RefreshState {
        let started = Instant::now();
        let paths = match self.lister.list_paths().await {
            Ok(paths) => paths,
            Err(e) => {
                error!(error = %e, "Failed to load repository listing");
                let failed = RefreshState::Failed(e);
                return if self.publish(failed.clone()) {
                    failed
                } else {
                    RefreshState::Superseded
                };
            }
        };

        let built = self.builder.build(&paths);
        let mut tree = built.tree;
        let posts = aggregate_posts(&mut tree);
        {
            let mut current = self.tree.write();
            if !self.is_current() {
                debug!(generation = self.generation, "Refresh superseded before publishing");
                return RefreshState::Superseded;
            }
            *current = tree;
            if self.breadcrumb.read().is_empty() {
                if let Some(top) = navigation::default_top_level(&current) {
                    let landing = navigation::auto_descend(&current, top);
                    *self.breadcrumb.write() = Breadcrumb::from_path(&current.node(landing).path);
                }
            }
            self.state.send_replace(RefreshState::Ready);
        }
        info!(
            paths = paths.len(),
            posts,
            descriptors = built.button_descriptors.len(),
            duration_ms = started.elapsed().as_millis(),
            "Content tree ready"
        );

        let report = self.resolve_buttons(&built.button_descriptors).await;
        debug!(attached = report.attached, failed = report.failed, "Button pass finished");
        RefreshState::Ready
    }

    async fn resolve_buttons(&self, descriptors: &[String]) -> ResolveReport {
        if !self.is_current() {
            return ResolveReport::default();
        }
        let resolver = ButtonResolver::new(Arc::clone(&self.texts)).with_scope(self.scope.clone());
        resolver.resolve(&self.tree, descriptors).await
    }
}

/// One browsing session over a content source
pub struct Session {
    config: BulletinConfig,
    tree: Arc<RwLock<ContentTree>>,
    breadcrumb: Arc<RwLock<Breadcrumb>>,
    queue: AssetFetchQueue,
    lister: Arc<dyn TreeSource>,
    texts: Arc<dyn TextSource>,
    urls: Arc<dyn ContentSource>,
    state: Arc<watch::Sender<RefreshState>>,
    refresh_scope: Mutex<(u64, CancellationScope)>,
    runtime: Handle,
}

impl Session {
    /// Create a session on the current tokio runtime
    pub fn new<S>(config: BulletinConfig, source: Arc<S>) -> Result<Self, ContentError>
    where
        S: ContentSource + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| ContentError::ConfigError(format!("No async runtime available: {}", e)))?;

        let cache = Arc::new(ContentCache::new());
        let queue = AssetFetchQueue::new(source.clone(), cache, runtime.clone())
            .with_timeout(config.fetch.asset_timeout());
        let (state, _) = watch::channel(RefreshState::Idle);

        Ok(Self {
            config,
            tree: Arc::new(RwLock::new(ContentTree::new())),
            breadcrumb: Arc::new(RwLock::new(Breadcrumb::new())),
            queue,
            lister: source.clone(),
            texts: source.clone(),
            urls: source,
            state: Arc::new(state),
            refresh_scope: Mutex::new((0, CancellationScope::new())),
            runtime,
        })
    }

    pub fn config(&self) -> &BulletinConfig {
        &self.config
    }

    /// Rebuild the tree from scratch in the background.
    ///
    /// The old tree and breadcrumb are dropped immediately and pending asset
    /// downloads are cancelled. A refresh started while another is running
    /// cancels it; the older one publishes nothing from then on.
    pub fn refresh(&self) -> RefreshHandle {
        let (generation, scope) = {
            let mut current = self.refresh_scope.lock();
            current.1.cancel();
            *current = (current.0 + 1, CancellationScope::new());
            (current.0, current.1.clone())
        };
        *self.tree.write() = ContentTree::new();
        self.breadcrumb.write().clear();
        self.queue.clear_and_cancel();
        self.state.send_replace(RefreshState::Loading);
        info!(generation, repo = %self.config.source.repo, "Refreshing content");

        let context = RefreshContext {
            generation,
            scope,
            tree: Arc::clone(&self.tree),
            breadcrumb: Arc::clone(&self.breadcrumb),
            state: Arc::clone(&self.state),
            lister: Arc::clone(&self.lister),
            texts: Arc::clone(&self.texts),
            builder: TreeBuilder::new().with_exclude_prefix(self.config.source.exclude_prefix.clone()),
        };
        RefreshHandle {
            task: self.runtime.spawn(context.run()),
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.subscribe()
    }

    /// Shared handle to the tree; hold the read guard only briefly
    pub fn tree(&self) -> Arc<RwLock<ContentTree>> {
        Arc::clone(&self.tree)
    }

    pub fn breadcrumb(&self) -> Breadcrumb {
        self.breadcrumb.read().clone()
    }

    /// Node selected by the breadcrumb; the root when it no longer matches
    pub fn current(&self) -> NodeId {
        navigation::node_by_breadcrumb(&self.tree.read(), &self.breadcrumb.read())
    }

    /// Select the node at `path`, descending to the first folder with images.
    ///
    /// Pending asset downloads for the previous selection are cancelled.
    pub fn navigate_to(&self, path: &str) -> Result<NodeId, ContentError> {
        if let RefreshState::Failed(e) = self.state() {
            return Err(e);
        }
        self.queue.clear_and_cancel();

        let tree = self.tree.read();
        let requested = Breadcrumb::from_path(path);
        let node = navigation::node_by_breadcrumb(&tree, &requested);
        let landing = navigation::auto_descend(&tree, node);
        *self.breadcrumb.write() = Breadcrumb::from_path(&tree.node(landing).path);
        debug!(requested = path, landed = %tree.node(landing).path, "Navigated");
        Ok(landing)
    }

    /// Replace everything below `level` with `segment` and navigate there
    pub fn select_child(&self, level: usize, segment: &str) -> Result<NodeId, ContentError> {
        let mut crumbs = self.breadcrumb();
        crumbs.truncate(level);
        crumbs.push(segment);
        self.navigate_to(&crumbs.to_path())
    }

    pub fn queue(&self) -> &AssetFetchQueue {
        &self.queue
    }

    pub fn asset_url(&self, path: &str) -> String {
        self.urls.asset_url(path)
    }

    /// Queue the asset at `path` unless it is cached or already on its way
    pub fn request_asset(&self, path: &str) -> bool {
        self.queue.enqueue(&self.asset_url(path))
    }

    pub fn asset_status(&self, path: &str) -> AssetStatus {
        self.queue.status(&self.asset_url(path))
    }

    /// Queue every image of `node` and of its posts; returns how many were added
    pub fn request_node_assets(&self, node: NodeId) -> usize {
        let paths: Vec<String> = {
            let tree = self.tree.read();
            let node = tree.node(node);
            node.image_paths
                .iter()
                .chain(node.posts.iter().flat_map(|post| post.image_paths.iter()))
                .cloned()
                .collect()
        };
        paths.iter().filter(|path| self.request_asset(path)).count()
    }
}
