//! Server-side components of the users gRPC service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI/environment configuration.
//! - [`service`] - The tonic service, call admission and shutdown.
//! - [`store`] - The in-memory user store and id sequence.
//! - [`streaming`] - Logic behind the server, client and bidirectional
//!   streaming calls.
//! - [`telemetry`] - Logging and optional OpenTelemetry export.
//!
//! These pieces are wired together in the server's `main.rs`.

pub mod config;
pub mod service;
pub mod store;
pub mod streaming;
pub mod telemetry;
