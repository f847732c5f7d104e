//! Per-call streaming: sessions, the paced emission loop, and the response
//! stream handed to tonic.
//!
//! - [`session`] - `StreamSession` and how a session ended.
//! - [`coordinator`] - `feed_locations`, the loop that moves points from a
//!   session's path to the client.
//! - [`guard`] - Response stream wrapper that cancels its session on drop.

pub mod coordinator;
pub mod guard;
pub mod session;
