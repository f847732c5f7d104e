use crate::{Error, Result};
use core::fmt;

/// A point on the earth's surface, in decimal degrees.
///
/// `Coordinate` is a plain `Copy` value: every step of a path produces a fresh
/// one and nothing holds on to it.
///
/// Points built with [`Coordinate::new`] are not range checked. A generated
/// path that keeps heading east walks its longitude past `180` unless the
/// caller asks for wrapping (see [`Coordinate::wrapped`]). Use
/// [`Coordinate::try_new`] for values that come from outside the program.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// Degrees north of the equator, `[-90, 90]`.
    pub latitude: f64,
    /// Degrees east of the prime meridian, nominally `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate without validating either component.
    ///
    /// # Example
    /// ```
    /// use roam::Coordinate;
    ///
    /// let silk_board = Coordinate::new(12.9177, 77.6238);
    /// assert_eq!(silk_board.latitude, 12.9177);
    /// ```
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Creates a coordinate, rejecting non-finite or out-of-range components.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLatitude`] if `latitude` is not in `[-90, 90]`.
    /// - [`Error::InvalidLongitude`] if `longitude` is not in `[-180, 180]`.
    ///
    /// # Example
    /// ```
    /// use roam::{Coordinate, Error};
    ///
    /// assert!(Coordinate::try_new(-33.8688, 151.2093).is_ok());
    /// assert_eq!(
    ///     Coordinate::try_new(91.0, 0.0),
    ///     Err(Error::InvalidLatitude(91.0))
    /// );
    /// ```
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidLongitude(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Returns the same point with its longitude folded into `[-180, 180)`.
    ///
    /// # Example
    /// ```
    /// use roam::Coordinate;
    ///
    /// let past_the_antimeridian = Coordinate::new(10.0, 190.0);
    /// assert_eq!(past_the_antimeridian.wrapped(), Coordinate::new(10.0, -170.0));
    /// ```
    #[must_use]
    pub fn wrapped(self) -> Self {
        Self {
            latitude: self.latitude,
            longitude: (self.longitude + 180.0).rem_euclid(360.0) - 180.0,
        }
    }

    /// Moves `distance_km` along the great circle leaving this point at
    /// `bearing_degrees`. Shorthand for [`crate::destination`].
    ///
    /// # Example
    /// ```
    /// use roam::{destination, Coordinate};
    ///
    /// let origin = Coordinate::new(12.9177, 77.6238);
    /// let east = origin.destination(90.0, 10.0 / 1500.0);
    /// assert_eq!(east, destination(origin, 90.0, 10.0 / 1500.0));
    /// assert!(east.longitude > origin.longitude);
    /// ```
    #[must_use]
    pub fn destination(self, bearing_degrees: f64, distance_km: f64) -> Self {
        crate::destination(self, bearing_degrees, distance_km)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Builds a coordinate from a `(latitude, longitude)` pair, unchecked.
///
/// # Example
/// ```
/// use roam::Coordinate;
///
/// let c: Coordinate = (-33.8688, 151.2093).into();
/// assert_eq!(c, Coordinate::new(-33.8688, 151.2093));
/// ```
impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_accepts_boundaries() {
        assert!(Coordinate::try_new(90.0, 180.0).is_ok());
        assert!(Coordinate::try_new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn try_new_rejects_out_of_range_and_nan() {
        assert_eq!(
            Coordinate::try_new(-90.5, 0.0),
            Err(Error::InvalidLatitude(-90.5))
        );
        assert_eq!(
            Coordinate::try_new(0.0, 180.25),
            Err(Error::InvalidLongitude(180.25))
        );
        assert!(matches!(
            Coordinate::try_new(f64::NAN, 0.0),
            Err(Error::InvalidLatitude(_))
        ));
        assert!(matches!(
            Coordinate::try_new(0.0, f64::INFINITY),
            Err(Error::InvalidLongitude(_))
        ));
    }

    #[test]
    fn wrapped_folds_into_half_open_range() {
        assert_eq!(Coordinate::new(0.0, 180.0).wrapped().longitude, -180.0);
        assert_eq!(Coordinate::new(0.0, -180.0).wrapped().longitude, -180.0);
        assert_eq!(Coordinate::new(0.0, 540.0).wrapped().longitude, -180.0);
        assert_eq!(Coordinate::new(0.0, -190.0).wrapped().longitude, 170.0);
        assert_eq!(Coordinate::new(0.0, 77.5).wrapped().longitude, 77.5);
        assert_eq!(Coordinate::new(45.0, 200.0).wrapped().latitude, 45.0);
    }

    #[test]
    fn display_uses_six_decimals() {
        let c = Coordinate::new(12.9177, 77.6238);
        assert_eq!(c.to_string(), "(12.917700, 77.623800)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_field_names() {
        let c = Coordinate::new(1.5, -2.25);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"latitude":1.5,"longitude":-2.25}"#);
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
