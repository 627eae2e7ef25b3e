//! Format content trees and asset reports as text.

use crate::assets::AssetStatus;
use crate::tree::navigation::{self, posts_newest_first, sorted_buttons};
use crate::tree::{ButtonEntry, ContentTree};
use crate::types::{NodeId, ORDER_UNSET};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::{json, Value};

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Indented outline of `start` and everything below it.
pub fn format_tree_text(tree: &ContentTree, start: NodeId, include_hidden: bool) -> String {
    let mut out = String::new();
    let heading = if start == tree.root() {
        "Content".to_string()
    } else {
        tree.node(start).path.clone()
    };
    out.push_str(&format!("{}\n\n", format_section_heading(&heading)));
    write_node_details(tree, start, 0, &mut out);
    write_children(tree, start, 1, include_hidden, &mut out);
    out
}

fn write_children(tree: &ContentTree, parent: NodeId, depth: usize, include_hidden: bool, out: &mut String) {
    let children = if include_hidden {
        navigation::sorted_children_with_hidden(tree, parent)
    } else {
        navigation::sorted_children(tree, parent)
    };
    for child in children {
        let node = tree.node(child.id);
        let indent = "  ".repeat(depth);
        let mut line = format!("{}{}", indent, child.display_name.bold());
        if node.hidden {
            line.push_str(&format!(" {}", "(hidden)".dimmed()));
        }
        if let Some(color) = node.bg_color {
            line.push_str(&format!(" {}", color.cyan()));
        }
        out.push_str(&line);
        out.push('\n');
        write_node_details(tree, child.id, depth, out);
        write_children(tree, child.id, depth + 1, include_hidden, out);
    }
}

fn write_node_details(tree: &ContentTree, id: NodeId, depth: usize, out: &mut String) {
    let node = tree.node(id);
    let indent = "  ".repeat(depth + 1);
    if !node.image_paths.is_empty() {
        out.push_str(&format!("{}images: {}\n", indent, node.image_paths.len()));
    }
    if let Some(header) = navigation::visible_header(tree, id) {
        let header = tree.node(header);
        out.push_str(&format!(
            "{}header: {} images, {} buttons\n",
            indent,
            header.image_paths.len(),
            header.buttons.len()
        ));
    }
    for post in posts_newest_first(&node.posts) {
        out.push_str(&format!(
            "{}post {} {} ({} images)\n",
            indent,
            post.number,
            post.title.yellow(),
            post.image_paths.len()
        ));
        for button in sorted_buttons(&post.buttons) {
            out.push_str(&format!("{}  {}\n", indent, format_button(button)));
        }
    }
    for button in sorted_buttons(&node.buttons) {
        out.push_str(&format!("{}{}\n", indent, format_button(button)));
    }
}

fn format_button(button: &ButtonEntry) -> String {
    format!("[{}] -> {}", button.display_name.green(), button.url)
}

/// The same outline as JSON, hidden folders included and flagged.
pub fn tree_to_json(tree: &ContentTree, id: NodeId) -> Value {
    let node = tree.node(id);
    let children: Vec<Value> = navigation::sorted_children_with_hidden(tree, id)
        .into_iter()
        .map(|child| tree_to_json(tree, child.id))
        .collect();
    let posts: Vec<Value> = posts_newest_first(&node.posts)
        .into_iter()
        .map(|post| {
            json!({
                "number": post.number,
                "title": post.title,
                "images": post.image_paths,
                "buttons": sorted_buttons(&post.buttons).into_iter().map(button_json).collect::<Vec<_>>(),
            })
        })
        .collect();
    let header = navigation::visible_header(tree, id).map(|h| {
        let h = tree.node(h);
        json!({
            "images": h.image_paths,
            "buttons": sorted_buttons(&h.buttons).into_iter().map(button_json).collect::<Vec<_>>(),
        })
    });

    json!({
        "name": navigation::display_name_of(tree, id),
        "path": node.path,
        "hidden": node.hidden,
        "color": node.bg_color.map(|c| c.to_string()),
        "images": node.image_paths,
        "header": header,
        "posts": posts,
        "buttons": sorted_buttons(&node.buttons).into_iter().map(button_json).collect::<Vec<_>>(),
        "children": children,
    })
}

fn button_json(button: &ButtonEntry) -> Value {
    json!({
        "label": button.display_name,
        "url": button.url,
        "order": (button.order != ORDER_UNSET).then_some(button.order),
    })
}

/// One row of the asset report
#[derive(Debug, Clone)]
pub struct AssetRow {
    pub path: String,
    pub status: AssetStatus,
    pub dimensions: Option<(u32, u32)>,
}

/// Table of asset outcomes followed by a one-line summary.
pub fn format_asset_report(rows: &[AssetRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Assets")));
    if rows.is_empty() {
        out.push_str("No images under this folder.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Status", "Size"]);
    for row in rows {
        let status = match &row.status {
            AssetStatus::Ready => "ready".to_string(),
            AssetStatus::Downloading => "downloading".to_string(),
            AssetStatus::Waiting => "waiting".to_string(),
            AssetStatus::Failed(reason) => format!("failed: {}", reason),
            AssetStatus::Missing => "not requested".to_string(),
        };
        let size = row
            .dimensions
            .map(|(w, h)| format!("{}x{}", w, h))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![row.path.clone(), status, size]);
    }
    out.push_str(&format!("{}\n\n", table));
    let ready = rows
        .iter()
        .filter(|r| r.status == AssetStatus::Ready)
        .count();
    out.push_str(&format!(
        "Total: {} images, {} loaded, {} failed.\n",
        rows.len(),
        ready,
        rows.iter()
            .filter(|r| matches!(r.status, AssetStatus::Failed(_)))
            .count()
    ));
    out
}
