//! gRPC service implementation and call bookkeeping.
//!
//! ## Structure
//!
//! - [`handler`] - gRPC service entry point ([`DirectoryService`]).
//! - [`call`] - Names and shapes of the seven calls, for logs and metrics.
//! - [`lifecycle`] - Admission, in-flight tracking and graceful shutdown.
//!
//! [`DirectoryService`]: handler::DirectoryService

pub mod call;
pub mod handler;
pub mod lifecycle;
