//! Error types for the users service.
//!
//! This module defines the central `Error` enum covering every failure a call
//! can report. It implements `From<Error>` for `tonic::Status` so handlers can
//! return it with `?` and have it land on the call's error channel with the
//! right status code.
//!
//! ## Error Cases
//! - `NotFound`: The requested user id is not in the store.
//! - `IdSpaceExhausted`: The id sequence reached the top of the `i32` range.
//! - `ChannelError`: An internal hand-off between tasks failed.
//! - `ServiceShutdown`: A call arrived while the service was shutting down.

use crate::types::UserId;
use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the users service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// No user is stored under `id`.
    #[error("User not found with ID: {id}")]
    NotFound { id: UserId },

    /// Every representable id has been handed out.
    #[error("User ID space exhausted")]
    IdSpaceExhausted,

    /// Internal channel send/receive failure (e.g., closed channel).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { .. } => Status::not_found(err.to_string()),
            Error::IdSpaceExhausted => Status::internal(err.to_string()),
            Error::ChannelError { context } => {
                Status::internal(format!("Channel error: {}", context))
            }
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn not_found_carries_the_requested_id() {
        let status = Status::from(Error::NotFound { id: 42 });
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "User not found with ID: 42");
    }

    #[test]
    fn internal_faults_map_to_internal() {
        assert_eq!(Status::from(Error::IdSpaceExhausted).code(), Code::Internal);
        let status = Status::from(Error::ChannelError {
            context: "receiver dropped".to_string(),
        });
        assert_eq!(status.code(), Code::Internal);
        assert!(status.message().contains("receiver dropped"));
    }

    #[test]
    fn shutdown_maps_to_unavailable() {
        assert_eq!(
            Status::from(Error::ServiceShutdown).code(),
            Code::Unavailable
        );
    }
}
