use crate::integration::support::png_bytes;
use bulletin::assets::{AssetFetchQueue, AssetStatus, ContentCache};
use bulletin::source::{ContentSource, StaticSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

fn source_with(count: usize, latency: Duration) -> Arc<StaticSource> {
    let mut source = StaticSource::new().with_latency(latency);
    for i in 0..count {
        source = source.with_blob(format!("img/{}.png", i), png_bytes(1, 1));
    }
    Arc::new(source)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enqueues_fetch_each_url_once() {
    let source = source_with(5, Duration::from_millis(5));
    let queue = AssetFetchQueue::new(
        source.clone(),
        Arc::new(ContentCache::new()),
        Handle::current(),
    );
    let urls: Vec<String> = (0..5).map(|i| source.asset_url(&format!("img/{}.png", i))).collect();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let queue = queue.clone();
        let urls = urls.clone();
        tasks.push(tokio::spawn(async move {
            for url in &urls {
                queue.enqueue(url);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    queue.wait_idle().await;

    for url in &urls {
        assert_eq!(source.fetch_count(url), 1, "{} fetched more than once", url);
        assert_eq!(queue.status(url), AssetStatus::Ready);
    }
    assert_eq!(queue.stats().completed, 5);
    assert_eq!(queue.cache().len(), 5);
}

#[tokio::test]
async fn fetches_run_one_at_a_time_in_order() {
    let source = source_with(3, Duration::from_millis(20));
    let queue = AssetFetchQueue::new(
        source.clone(),
        Arc::new(ContentCache::new()),
        Handle::current(),
    );
    let urls: Vec<String> = (0..3).map(|i| source.asset_url(&format!("img/{}.png", i))).collect();
    for url in &urls {
        queue.enqueue(url);
    }

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(queue.status(&urls[0]), AssetStatus::Downloading);
    assert_eq!(queue.status(&urls[1]), AssetStatus::Waiting);
    assert_eq!(queue.status(&urls[2]), AssetStatus::Waiting);
    assert_eq!(queue.stats().in_flight, 1);

    queue.wait_idle().await;
    assert!(urls.iter().all(|u| queue.status(u) == AssetStatus::Ready));
}

#[tokio::test]
async fn cancelled_scope_never_writes_results() {
    let source = source_with(2, Duration::from_millis(30));
    let cache = Arc::new(ContentCache::new());
    let queue = AssetFetchQueue::new(source.clone(), Arc::clone(&cache), Handle::current());
    let first = source.asset_url("img/0.png");
    let second = source.asset_url("img/1.png");

    queue.enqueue(&first);
    tokio::time::sleep(Duration::from_millis(5)).await;
    queue.clear_and_cancel();
    queue.enqueue(&second);
    queue.wait_idle().await;
    tokio::time::sleep(Duration::from_millis(40)).await;

    assert!(cache.get(&first).is_none());
    assert!(cache.error(&first).is_none());
    assert!(cache.get(&second).is_some());
}
