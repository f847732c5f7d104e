#![doc = include_str!("../README.md")]

mod common;
pub use common::*;
// Public re-export so downstream crates can access `roam` via
// `roam_tonic_core::roam`
pub use roam;
