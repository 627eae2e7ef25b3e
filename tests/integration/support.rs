use bulletin::source::StaticSource;
use bulletin::tree::{aggregate_posts, ContentTree, TreeBuilder};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn build(paths: &[String]) -> (ContentTree, Vec<String>) {
    let built = TreeBuilder::new().build(paths);
    let mut tree = built.tree;
    aggregate_posts(&mut tree);
    (tree, built.button_descriptors)
}

/// The two-folder repository used across scenario tests
pub fn scenario_source() -> StaticSource {
    StaticSource::new()
        .with_blob("A/1.Intro/x.png", png_bytes(3, 3))
        .with_path("A/Hide.txt")
        .with_blob("B/Header/logo.png", png_bytes(8, 2))
        .with_blob("B/Post.2 Sale/y.png", png_bytes(2, 4))
        .with_text("B/Post.2 Sale/Button Buy.txt", "  https://shop.example/buy \n")
}

/// Stable textual dump of every reachable node, for equality checks
pub fn dump(tree: &ContentTree) -> Vec<String> {
    tree.reachable()
        .into_iter()
        .map(|id| {
            let node = tree.node(id);
            let mut images = node.image_paths.clone();
            images.sort();
            let mut posts: Vec<String> = node
                .posts
                .iter()
                .map(|p| format!("{}:{}:{:?}:{}", p.number, p.title, p.image_paths, p.buttons.len()))
                .collect();
            posts.sort();
            format!(
                "{} hidden={} color={:?} images={:?} posts={:?} buttons={}",
                node.path,
                node.hidden,
                node.bg_color,
                images,
                posts,
                node.buttons.len()
            )
        })
        .collect()
}
