//! Core types shared across the content tree and asset pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order value for names without an explicit `N.` prefix; sorts last.
pub const ORDER_UNSET: i32 = i32::MAX;

/// NodeId: index of a folder node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Address of a post inside its owning node's `posts` list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId {
    pub node: NodeId,
    pub index: usize,
}

/// Opaque 8-bit RGBA color. Colors parsed from names are always fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 0xFF }
    }

    /// Window backdrop used when no folder on the path declares a color.
    pub const BACKDROP: Rgba = Rgba::opaque(0x00, 0x00, 0x00);
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
