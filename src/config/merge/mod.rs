//! Merge policy and the service composing all sources.

pub mod merge_policy;
pub mod service;
