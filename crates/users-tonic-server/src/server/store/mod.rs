//! In-process user storage.
//!
//! - [`sequence`] - Lock-free, monotonically increasing id allocation.
//! - [`repo`] - The [`UserStore`] shared by every call handler.
//!
//! The store is owned by the service instance and handed to handlers through
//! an `Arc`; there is no process-global state.

pub mod repo;
pub mod sequence;

pub use repo::UserStore;
