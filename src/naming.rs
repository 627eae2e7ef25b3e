//! Naming Conventions
//!
//! Pure classification of file and folder names. Content authors drive the
//! whole tree through names alone: `N.` prefixes order siblings, `Hide.txt`
//! hides a folder, `Color #RRGGBB` files tint it, `Post.N Title` folders
//! become posts and `Button*.txt` files describe links.

use crate::types::{Rgba, ORDER_UNSET};
use once_cell::sync::Lazy;
use regex::Regex;

/// Exact name of the visibility marker file.
pub const HIDE_MARKER: &str = "Hide.txt";

/// Folder name holding header content for its parent.
pub const HEADER_FOLDER: &str = "Header";

/// Label used when a button descriptor names nothing.
pub const DEFAULT_BUTTON_LABEL: &str = "Link";

const BUTTON_PREFIX: &str = "Button";
const COLOR_PREFIX: &str = "Color";
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

static POST_FOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Post\.[0-9]+\b").expect("post folder pattern"));
static POST_FOLDER_PARTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Post\.([0-9]+)(?:\s+(.*))?$").expect("post parts pattern"));
static POST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Post\.([0-9]+)").expect("post number pattern"));
static NUMBERED_BUTTON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[0-9]+\s*\.\s*Button").expect("numbered button pattern"));
static COLOR_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([0-9A-Fa-f]{6})\b").expect("color annotation pattern"));

/// Split a leading `N.` ordering prefix from a name.
///
/// `"3.Intro"` yields `(3, "Intro")`. Names without a numeric prefix come back
/// unchanged with [`ORDER_UNSET`].
pub fn parse_order_and_name(raw: &str) -> (i32, &str) {
    if raw.is_empty() {
        return (ORDER_UNSET, raw);
    }
    let trimmed = raw.trim_start();
    if let Some(dot) = trimmed.find('.') {
        if dot > 0 {
            if let Ok(order) = trimmed[..dot].trim().parse::<i32>() {
                return (order, trimmed[dot + 1..].trim_start());
            }
        }
    }
    (ORDER_UNSET, raw)
}

/// Display name with any ordering prefix removed.
pub fn display_name(raw: &str) -> &str {
    parse_order_and_name(raw).1
}

pub fn is_hidden_marker(file_name: &str) -> bool {
    file_name == HIDE_MARKER
}

pub fn is_header_folder(name: &str) -> bool {
    name.eq_ignore_ascii_case(HEADER_FOLDER)
}

/// Parse a `Color #RRGGBB` stem. Only the first `#` is considered and the six
/// characters after it must all be hex digits.
pub fn try_parse_color(stem: &str) -> Option<Rgba> {
    if !starts_with_ignore_case(stem, COLOR_PREFIX) {
        return None;
    }
    let hash = stem.find('#')?;
    let hex = stem.get(hash + 1..hash + 7)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba::opaque(channel(0)?, channel(2)?, channel(4)?))
}

pub fn is_image_file(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

pub fn is_post_folder(name: &str) -> bool {
    POST_FOLDER.is_match(name)
}

/// Number and title of a `Post.N[ Title]` folder. The title defaults to `Post N`.
///
/// Returns `None` when the name does not match the full pattern, which can
/// happen for names accepted by [`is_post_folder`] such as `Post.3-draft`.
pub fn parse_post_folder(name: &str) -> Option<(u32, String)> {
    let caps = POST_FOLDER_PARTS.captures(name)?;
    let number = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let title = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Post {}", number));
    Some((number, title))
}

/// Leading post number of a folder name, ignoring whatever follows it.
pub fn post_number(name: &str) -> Option<u32> {
    POST_NUMBER.captures(name)?.get(1)?.as_str().parse().ok()
}

pub fn is_button_file(file_name: &str) -> bool {
    let is_txt = file_extension(file_name)
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if !is_txt {
        return false;
    }
    let stem = file_stem(file_name);
    starts_with_ignore_case(stem, BUTTON_PREFIX) || NUMBERED_BUTTON.is_match(stem)
}

/// Derive `(display_name, order)` for a button descriptor file.
///
/// Both `1.Button Discord #336699.txt` and `Button 1.Discord.txt` yield
/// `("Discord", 1)`.
pub fn parse_button_name(file_name: &str) -> (String, i32) {
    let stem = file_stem(file_name);
    let (order, rest) = parse_order_and_name(stem);

    if order != ORDER_UNSET {
        let mut rest = rest.trim_start();
        if starts_with_ignore_case(rest, BUTTON_PREFIX) {
            rest = rest[BUTTON_PREFIX.len()..].trim_start();
        }
        let label = strip_color_annotation(rest);
        return (label_or_default(label), order);
    }

    if !starts_with_ignore_case(stem, BUTTON_PREFIX) {
        return (DEFAULT_BUTTON_LABEL.to_string(), ORDER_UNSET);
    }
    let rest = strip_color_annotation(stem[BUTTON_PREFIX.len()..].trim_start());
    let (order, label) = parse_order_and_name(&rest);
    (label_or_default(label.to_string()), order)
}

/// File name without its last extension (`"a.b.txt"` -> `"a.b"`).
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    }
}

/// Text after the last `.`, if any.
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|dot| &file_name[dot + 1..])
}

fn strip_color_annotation(text: &str) -> String {
    match COLOR_ANNOTATION.find(text) {
        Some(m) => text.replace(m.as_str(), "").trim().to_string(),
        None => text.to_string(),
    }
}

fn label_or_default(label: String) -> String {
    if label.is_empty() {
        DEFAULT_BUTTON_LABEL.to_string()
    } else {
        label
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}
