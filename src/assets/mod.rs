//! Asset Pipeline
//!
//! Session cache of decoded images and the queue that fills it. The
//! rendering surface reads the cache and error map by URL and enqueues
//! whatever it is missing; navigation clears the queue and cancels the
//! current scope so stale downloads never leak into a new view.

pub mod cache;
pub mod cancel;
pub mod queue;

pub use cache::{decode_image, ContentCache, DecodedImage};
pub use cancel::CancellationScope;
pub use queue::{AssetFetchQueue, AssetStatus, QueueStats};
