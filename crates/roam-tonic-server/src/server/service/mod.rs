//! gRPC service implementation and session lifecycle.
//!
//! ## Structure
//!
//! - [`config`] - Path generator used when none is supplied explicitly.
//! - [`handler`] - gRPC service entry point (`LocationStreamService`).

pub mod config;
pub mod handler;
