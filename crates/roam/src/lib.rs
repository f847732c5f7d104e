#![doc = include_str!("../README.md")]

mod coordinate;
mod error;
#[cfg(feature = "futures")]
mod futures;
mod geodesy;
mod path;

pub use crate::coordinate::*;
pub use crate::error::*;
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::geodesy::*;
pub use crate::path::*;
