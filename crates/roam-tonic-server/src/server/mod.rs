//! Server-side building blocks for the `location-server` binary.
//!
//! ## Structure
//!
//! - [`config`] - CLI/environment configuration and its validation.
//! - [`service`] - gRPC service entry point (`LocationStreamService`).
//! - [`streaming`] - Per-call sessions and the paced emission loop.
//! - [`telemetry`] - Logging, tracing and metrics setup.

pub mod config;
pub mod service;
pub mod streaming;
pub mod telemetry;
