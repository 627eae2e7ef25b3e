use crate::integration::support::{build, scenario_source};
use bulletin::assets::AssetStatus;
use bulletin::config::BulletinConfig;
use bulletin::source::{StaticSource, TreeSource};
use bulletin::tree::navigation::{self, sorted_children};
use bulletin::{ButtonResolver, RefreshState, Session, ORDER_UNSET};
use parking_lot::RwLock;
use std::sync::Arc;

#[tokio::test]
async fn two_folder_repository_builds_expected_tree() {
    let source = Arc::new(scenario_source());
    let paths = source.list_paths().await.unwrap();
    let (tree, descriptors) = build(&paths);
    assert_eq!(descriptors, vec!["B/Post.2 Sale/Button Buy.txt"]);

    let a = tree.find_path("A").unwrap();
    assert!(tree.node(a).hidden);
    let intro = tree.find_path("A/1.Intro").unwrap();
    assert_eq!(tree.node(intro).image_paths, vec!["A/1.Intro/x.png"]);

    let b = tree.find_path("B").unwrap();
    assert_eq!(tree.node(b).children.len(), 1);
    let header = tree.find_path("B/Header").unwrap();
    assert_eq!(tree.node(header).image_paths, vec!["B/Header/logo.png"]);
    assert_eq!(tree.node(b).posts.len(), 1);
    assert_eq!(tree.node(b).posts[0].number, 2);
    assert_eq!(tree.node(b).posts[0].title, "Sale");
    assert_eq!(tree.node(b).posts[0].image_paths, vec!["B/Post.2 Sale/y.png"]);

    let visible: Vec<String> = sorted_children(&tree, tree.root())
        .into_iter()
        .map(|c| c.display_name)
        .collect();
    assert_eq!(visible, vec!["B"]);

    let tree = RwLock::new(tree);
    let report = ButtonResolver::new(source).resolve(&tree, &descriptors).await;
    assert_eq!(report.attached, 1);

    let tree = tree.read();
    let buttons = &tree.node(b).posts[0].buttons;
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].display_name, "Buy");
    assert_eq!(buttons[0].url, "https://shop.example/buy");
    assert_eq!(buttons[0].order, ORDER_UNSET);
}

#[tokio::test]
async fn session_refresh_and_asset_loading() {
    let source = Arc::new(scenario_source());
    let session = Session::new(BulletinConfig::default(), Arc::clone(&source)).unwrap();

    let mut states = session.subscribe();
    let handle = session.refresh();
    assert_eq!(*states.borrow_and_update(), RefreshState::Loading);
    assert_eq!(handle.join().await, RefreshState::Ready);

    assert_eq!(session.breadcrumb().to_path(), "B");
    let b = session.current();
    {
        let tree = session.tree();
        let tree = tree.read();
        let header = navigation::visible_header(&tree, b).unwrap();
        assert_eq!(tree.node(header).name, "Header");
    }

    assert_eq!(session.request_node_assets(b), 1);
    session.queue().wait_idle().await;
    assert_eq!(session.asset_status("B/Post.2 Sale/y.png"), AssetStatus::Ready);

    let image = session
        .queue()
        .cached(&session.asset_url("B/Post.2 Sale/y.png"))
        .unwrap();
    assert_eq!((image.width, image.height), (2, 4));

    // Already cached, so a second request is a no-op
    assert!(!session.request_asset("B/Post.2 Sale/y.png"));
    assert_eq!(source.fetch_count(&session.asset_url("B/Post.2 Sale/y.png")), 1);
}

#[tokio::test]
async fn excluded_prefix_and_empty_repository() {
    let source = Arc::new(
        StaticSource::new()
            .with_path("WindowFiles/app.exe")
            .with_path("windowfiles/icon.png"),
    );
    let session = Session::new(BulletinConfig::default(), source).unwrap();
    assert!(session.refresh().join().await.is_ready());

    let tree = session.tree();
    assert!(tree.read().is_empty());
    assert!(session.breadcrumb().is_empty());
    assert_eq!(session.current(), tree.read().root());
}
