//! Bulletin: convention-driven content trees
//!
//! Turns a flat repository listing into a navigable folder hierarchy whose
//! ordering, visibility, colors, posts and link buttons come from file and
//! folder names alone, and loads the images behind it through a cancellable
//! fetch queue backed by a session cache.

pub mod assets;
pub mod buttons;
pub mod config;
pub mod error;
pub mod logging;
pub mod naming;
pub mod session;
pub mod source;
pub mod tooling;
pub mod tree;
pub mod types;

pub use assets::{AssetFetchQueue, AssetStatus, CancellationScope, ContentCache};
pub use buttons::{ButtonResolver, ResolveReport};
pub use error::{ContentError, FetchError};
pub use session::{RefreshHandle, RefreshState, Session};
pub use tree::{BuiltTree, ContentTree, TreeBuilder};
pub use types::{NodeId, PostId, Rgba, ORDER_UNSET};
