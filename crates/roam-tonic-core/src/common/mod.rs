//! Shared types and error definitions used by the server and its clients.
//!
//! ## Submodules
//!
//! - [`error`] - Service error type and its mapping to gRPC status codes.
//! - [`types`] - Default scenario constants and wire conversions.
//! - [`proto`] - Generated protobuf messages and service stubs.

pub mod error;
pub mod types;

pub use error::{Error, Result};

pub mod proto {
    tonic::include_proto!("location");
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("location_descriptor");
}
