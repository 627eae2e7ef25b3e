use crate::integration::support::{build, dump};
use proptest::prelude::*;
use std::collections::BTreeSet;

const FOLDERS: &[&str] = &[
    "A",
    "B",
    "1.Intro",
    "2.Outro",
    "Header",
    "Post.1 News",
    "Post.2",
    "Deep",
];

const FILES: &[&str] = &[
    "x.png",
    "y.JPG",
    "anim.gif",
    "Hide.txt",
    "Button Go.txt",
    "1.Button Buy #336699.txt",
    "Color #112233.txt",
    "bg #445566.png",
    "notes.md",
];

fn path_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop::sample::select(FOLDERS), 0..4),
        prop::sample::select(FILES),
    )
        .prop_map(|(folders, file)| {
            let mut segments: Vec<&str> = folders;
            segments.push(file);
            segments.join("/")
        })
}

fn node_paths(paths: &[String]) -> BTreeSet<String> {
    let (tree, _) = build(paths);
    tree.reachable()
        .into_iter()
        .map(|id| tree.node(id).path.clone())
        .collect()
}

proptest! {
    #[test]
    fn same_listing_builds_same_tree(paths in prop::collection::vec(path_strategy(), 0..40)) {
        let (first, first_buttons) = build(&paths);
        let (second, second_buttons) = build(&paths);
        prop_assert_eq!(dump(&first), dump(&second));
        prop_assert_eq!(first_buttons, second_buttons);
    }

    #[test]
    fn listing_order_does_not_change_folder_set(
        (paths, shuffled) in prop::collection::vec(path_strategy(), 0..40)
            .prop_flat_map(|paths| (Just(paths.clone()), Just(paths).prop_shuffle()))
    ) {
        prop_assert_eq!(node_paths(&paths), node_paths(&shuffled));
    }

    #[test]
    fn no_post_folder_survives_aggregation(paths in prop::collection::vec(path_strategy(), 0..40)) {
        let (tree, _) = build(&paths);
        for id in tree.reachable() {
            prop_assert!(!tree.node(id).name.starts_with("Post."));
        }
    }
}
