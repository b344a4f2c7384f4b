//! Per-shape streaming logic, kept apart from the tonic trait plumbing.
//!
//! - [`listing`] - Server-streaming: slices a store snapshot into a page and
//!   feeds it down a channel.
//! - [`batch`] - Client-streaming: creates every inbound user, then
//!   summarises.
//! - [`chat`] - Bidirectional: answers each inbound lookup as it arrives.
//!
//! Each function takes a plain `Stream`/`mpsc::Sender` rather than tonic's
//! `Streaming`, so it can be driven directly from tests.

pub mod batch;
pub mod chat;
pub mod listing;
