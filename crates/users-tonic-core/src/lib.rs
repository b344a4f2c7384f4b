#![doc = include_str!("../README.md")]

pub mod common;
pub use common::*;
// Re-exported so downstream crates can reach the clock types via
// `users_tonic_core::ferroid`.
pub use ferroid;
