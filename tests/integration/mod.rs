//! Integration tests for the bulletin content pipeline

mod asset_queue;
mod scenario;
mod support;
mod tree_determinism;
