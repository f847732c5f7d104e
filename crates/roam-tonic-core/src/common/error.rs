//! Error types for the location streaming service.
//!
//! This module defines the central `Error` enum for failures that are
//! reported to clients. It implements `From<Error>` for `tonic::Status` so
//! handlers can return it with `?` or `.into()`.
//!
//! ## Error Cases
//! - `InvalidRequest`: The client request was malformed (for example, an
//!   empty user identifier).
//! - `ServiceShutdown`: A request arrived, or a stream was still running,
//!   while the service was shutting down.
//!
//! A client cancelling its own stream is not an error and has no variant.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the location streaming service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The client request was invalid.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl Error {
    /// The error returned when a request carries no user identifier.
    pub fn missing_user_id() -> Self {
        Self::InvalidRequest {
            reason: "user identifier is required".to_string(),
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidRequest { reason } => Status::invalid_argument(reason),
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}
