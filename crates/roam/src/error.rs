use core::fmt;

/// A result type for the validating constructors in this crate.
///
/// Path generation itself is infallible; only building a [`Coordinate`] or
/// [`PathRequest`] from untrusted values can fail.
///
/// [`Coordinate`]: crate::Coordinate
/// [`PathRequest`]: crate::PathRequest
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All possible errors that `roam` can produce.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Latitude was not finite or fell outside `[-90, 90]`.
    InvalidLatitude(f64),

    /// Longitude was not finite or fell outside `[-180, 180]`.
    InvalidLongitude(f64),

    /// Total distance was not finite or was negative.
    InvalidDistance(f64),

    /// Bearing was not finite or fell outside `[0, 360)`.
    InvalidBearing(f64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLatitude(v) => {
                write!(f, "latitude {v} must be a finite value in [-90, 90]")
            }
            Self::InvalidLongitude(v) => {
                write!(f, "longitude {v} must be a finite value in [-180, 180]")
            }
            Self::InvalidDistance(v) => {
                write!(f, "total distance {v} km must be finite and non-negative")
            }
            Self::InvalidBearing(v) => {
                write!(f, "bearing {v} must be a finite value in [0, 360)")
            }
        }
    }
}

impl core::error::Error for Error {}
