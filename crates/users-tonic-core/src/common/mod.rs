//! Shared types and error definitions used by the users server and client.
//!
//! ## Submodules
//!
//! - [`error`] - Service error type and its mapping onto `tonic::Status`.
//! - [`types`] - Id and timestamp aliases plus the store's clock.
//! - [`proto`] - Generated protobuf messages and gRPC stubs.

pub mod error;
pub mod types;

pub use error::{Error, Result};

/// gRPC service and message definitions generated from `proto/users.proto`.
///
/// ## Service
///
/// - `UserService` - four unary CRUD calls plus one call per streaming shape
///   (`ListUsers`, `CreateMultipleUsers`, `ChatWithUsers`).
///
/// ## Messages
///
/// - [`proto::User`] - The stored record, timestamps in epoch milliseconds.
/// - [`proto::UserStatus`] - `Unspecified`, `Active`, `Inactive`.
///
/// `FILE_DESCRIPTOR_SET` holds the encoded descriptors for gRPC reflection.
pub mod proto {
    tonic::include_proto!("users");
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("users_descriptor");
}
