//! # Default Scenario and Wire Conversions
//!
//! The server simulates one scenario for every caller. Its defaults live here
//! so the server's configuration layer and any client-side tooling agree on
//! them:
//!
//! - [`DEFAULT_START`] - Silk Board junction, Bangalore
//! - [`DEFAULT_TOTAL_DISTANCE_KM`] - 10 km
//! - [`DEFAULT_STEP_COUNT`] - 1500 points
//! - [`DEFAULT_BEARING_DEGREES`] - due east
//! - [`DEFAULT_STEP_INTERVAL`] - 500 ms between points
//!
//! Every value can be overridden when the server starts.

use crate::proto::UserLocation;
use core::time::Duration;
use roam::{Coordinate, PathRequest};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 9000;

/// Where the default path begins.
pub const DEFAULT_START: Coordinate = Coordinate::new(12.9177, 77.6238);

/// Length of the default path.
pub const DEFAULT_TOTAL_DISTANCE_KM: f64 = 10.0;

/// Number of points in the default path.
pub const DEFAULT_STEP_COUNT: usize = 1500;

/// Compass direction of the default path.
pub const DEFAULT_BEARING_DEGREES: f64 = 90.0;

/// Delay between consecutive points of a stream.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(500);

/// The complete default scenario.
pub const DEFAULT_SCENARIO: PathRequest = PathRequest::new(
    DEFAULT_START,
    DEFAULT_TOTAL_DISTANCE_KM,
    DEFAULT_STEP_COUNT,
    DEFAULT_BEARING_DEGREES,
);

impl From<Coordinate> for UserLocation {
    fn from(c: Coordinate) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

impl From<UserLocation> for Coordinate {
    fn from(l: UserLocation) -> Self {
        Self::new(l.latitude, l.longitude)
    }
}
