//! Content Tree
//!
//! Arena-backed folder hierarchy built from a flat repository listing, with
//! post aggregation and read-only navigation queries.

pub mod builder;
pub mod navigation;
pub mod node;
pub mod posts;

pub use builder::{BuiltTree, TreeBuilder};
pub use node::{ButtonEntry, ContentNode, ContentTree, PostEntry};
pub use posts::aggregate_posts;
