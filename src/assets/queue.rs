//! Asset Fetch Queue
//!
//! FIFO queue of asset URLs drained by a single sequential task per
//! cancellation scope. Enqueueing deduplicates against the cache, the
//! in-flight set and the pending queue in one locked step.

use super::cache::{decode_image, ContentCache, DecodedImage};
use super::cancel::CancellationScope;
use crate::error::FetchError;
use crate::source::BinarySource;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, trace, warn};

/// What the rendering surface should show for a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Ready,
    Downloading,
    Waiting,
    Failed(String),
    /// Never requested in this scope
    Missing,
}

/// Queue statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Number of URLs waiting to be fetched
    pub pending: usize,
    /// Number of URLs currently being fetched
    pub in_flight: usize,
    /// Fetches that ended in the cache
    pub completed: usize,
    /// Fetches that ended in the error map
    pub failed: usize,
    /// Results thrown away because their scope was cancelled
    pub discarded: usize,
}

struct QueueState {
    pending: VecDeque<String>,
    queued: HashSet<String>,
    in_flight: HashSet<String>,
    draining: bool,
    scope: CancellationScope,
    fetch_timeout: Option<Duration>,
    completed: usize,
    failed: usize,
    discarded: usize,
}

impl QueueState {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            queued: HashSet::new(),
            in_flight: HashSet::new(),
            draining: false,
            scope: CancellationScope::new(),
            fetch_timeout: None,
            completed: 0,
            failed: 0,
            discarded: 0,
        }
    }

    fn is_current(&self, scope: &CancellationScope) -> bool {
        self.scope.same_as(scope) && !scope.is_cancelled()
    }
}

struct Shared {
    state: Mutex<QueueState>,
    cache: Arc<ContentCache>,
    source: Arc<dyn BinarySource>,
    idle: Notify,
}

enum FetchOutcome {
    Loaded(DecodedImage),
    Failed(String),
    Cancelled,
}

/// Session-wide asset download queue. Clones share the same queue.
#[derive(Clone)]
pub struct AssetFetchQueue {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl AssetFetchQueue {
    /// Create a queue whose drain loops run on `runtime`
    pub fn new(source: Arc<dyn BinarySource>, cache: Arc<ContentCache>, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::new()),
                cache,
                source,
                idle: Notify::new(),
            }),
            runtime,
        }
    }

    /// Abort each fetch after `timeout`; reported as "Request timeout"
    pub fn with_timeout(self, timeout: Option<Duration>) -> Self {
        self.shared.state.lock().fetch_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.shared.cache
    }

    /// Queue `url` unless it is cached, downloading or already waiting.
    ///
    /// Returns whether the URL was added. Starts a drain loop if none is active.
    pub fn enqueue(&self, url: &str) -> bool {
        let start_scope = {
            let mut state = self.shared.state.lock();
            if self.shared.cache.contains(url)
                || state.in_flight.contains(url)
                || state.queued.contains(url)
            {
                return false;
            }
            state.pending.push_back(url.to_string());
            state.queued.insert(url.to_string());
            trace!(url, pending = state.pending.len(), "Queued asset");

            if state.draining {
                None
            } else {
                state.draining = true;
                Some(state.scope.clone())
            }
        };

        if let Some(scope) = start_scope {
            let shared = Arc::clone(&self.shared);
            self.runtime.spawn(drain(shared, scope));
        }
        true
    }

    /// Cancel the current scope and forget all pending and in-flight work.
    ///
    /// Fetches already running finish on their own, but their results are
    /// discarded. Cancellation is not a failure, so error entries for the
    /// URLs that were in flight are cleared.
    pub fn clear_and_cancel(&self) {
        let mut state = self.shared.state.lock();
        state.scope.cancel();
        state.scope = CancellationScope::new();
        for url in state.in_flight.drain() {
            self.shared.cache.clear_error(&url);
        }
        let dropped = state.pending.len();
        state.pending.clear();
        state.queued.clear();
        state.draining = false;
        drop(state);

        self.shared.idle.notify_waiters();
        debug!(dropped, "Cleared asset queue and cancelled scope");
    }

    pub fn is_queued(&self, url: &str) -> bool {
        self.shared.state.lock().queued.contains(url)
    }

    pub fn is_in_flight(&self, url: &str) -> bool {
        self.shared.state.lock().in_flight.contains(url)
    }

    pub fn cached(&self, url: &str) -> Option<Arc<DecodedImage>> {
        self.shared.cache.get(url)
    }

    pub fn error(&self, url: &str) -> Option<String> {
        self.shared.cache.error(url)
    }

    pub fn status(&self, url: &str) -> AssetStatus {
        if self.shared.cache.contains(url) {
            return AssetStatus::Ready;
        }
        {
            let state = self.shared.state.lock();
            if state.in_flight.contains(url) {
                return AssetStatus::Downloading;
            }
            if state.queued.contains(url) {
                return AssetStatus::Waiting;
            }
        }
        match self.shared.cache.error(url) {
            Some(reason) => AssetStatus::Failed(reason),
            None => AssetStatus::Missing,
        }
    }

    pub fn is_draining(&self) -> bool {
        self.shared.state.lock().draining
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.shared.state.lock();
        QueueStats {
            pending: state.pending.len(),
            in_flight: state.in_flight.len(),
            completed: state.completed,
            failed: state.failed,
            discarded: state.discarded,
        }
    }

    /// Wait until no drain loop is active in the current scope
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if !self.is_draining() {
                return;
            }
            notified.await;
        }
    }
}

async fn drain(shared: Arc<Shared>, scope: CancellationScope) {
    debug!("Asset drain loop started");
    let started = Instant::now();
    let mut fetched = 0usize;

    loop {
        let (url, timeout) = {
            let mut state = shared.state.lock();
            if !state.is_current(&scope) {
                break;
            }
            let Some(url) = state.pending.pop_front() else {
                state.draining = false;
                break;
            };
            state.queued.remove(&url);
            if state.in_flight.contains(&url) || shared.cache.contains(&url) {
                continue;
            }
            state.in_flight.insert(url.clone());
            (url, state.fetch_timeout)
        };

        let outcome = fetch_one(&shared, &scope, &url, timeout).await;
        fetched += 1;

        let mut state = shared.state.lock();
        if !state.is_current(&scope) {
            state.discarded += 1;
            trace!(url = %url, "Discarding result from cancelled scope");
            continue;
        }
        state.in_flight.remove(&url);
        match outcome {
            FetchOutcome::Loaded(image) => {
                state.completed += 1;
                shared.cache.insert(&url, image);
                debug!(url = %url, "Asset cached");
            }
            FetchOutcome::Failed(reason) => {
                state.failed += 1;
                warn!(url = %url, reason = %reason, "Asset fetch failed");
                shared.cache.record_error(&url, reason);
            }
            FetchOutcome::Cancelled => {
                shared.cache.clear_error(&url);
            }
        }
    }

    shared.idle.notify_waiters();
    debug!(
        fetched,
        duration_ms = started.elapsed().as_millis(),
        "Asset drain loop stopped"
    );
}

async fn fetch_one(
    shared: &Shared,
    scope: &CancellationScope,
    url: &str,
    timeout: Option<Duration>,
) -> FetchOutcome {
    let request = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, shared.source.fetch_bytes(url))
                .await
                .unwrap_or(Err(FetchError::Timeout)),
            None => shared.source.fetch_bytes(url).await,
        }
    };

    let result = tokio::select! {
        _ = scope.cancelled() => Err(FetchError::Cancelled),
        result = request => result,
    };

    match result {
        Ok(bytes) => match decode_image(&bytes) {
            Ok(image) => FetchOutcome::Loaded(image),
            Err(reason) => FetchOutcome::Failed(reason),
        },
        Err(FetchError::Cancelled) => FetchOutcome::Cancelled,
        Err(err) => FetchOutcome::Failed(err.reason()),
    }
}
