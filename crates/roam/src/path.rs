use crate::{Coordinate, Error, Result, destination};
use core::iter::FusedIterator;

/// A source of simulated movement.
///
/// Implementors describe a path once and hand out a fresh iterator per call
/// to [`generate`]. Iterators never share mutable state, so any number of
/// callers can walk the same path concurrently and each sees the full
/// sequence from the beginning.
///
/// [`generate`]: PathGenerator::generate
pub trait PathGenerator {
    /// The iterator produced for a single walk along the path.
    type Path: Iterator<Item = Coordinate>;

    /// Starts a new walk from the beginning of the path.
    fn generate(&self) -> Self::Path;
}

/// Parameters for a constant-bearing, constant-speed path.
///
/// The path starts at `start` and takes `step_count` equal hops of
/// `total_distance_km / step_count` kilometres each. Every hop leaves the
/// current point at `bearing_degrees`, so the walk approximates straight-line
/// travel in a fixed compass direction.
///
/// `PathRequest` is `Copy` and immutable; it is the configuration for a walk,
/// not the walk itself. See [`PathRequest::generate`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathRequest {
    pub start: Coordinate,
    pub total_distance_km: f64,
    pub step_count: usize,
    pub bearing_degrees: f64,
    /// Fold every produced longitude into `[-180, 180)`. Off by default, in
    /// which case a path crossing the antimeridian keeps counting past `180`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wrap_longitude: bool,
}

impl PathRequest {
    /// Creates a path description without validating it.
    ///
    /// Degenerate values are allowed: a `step_count` of `0` produces an empty
    /// path and a `total_distance_km` of `0` repeats `start` `step_count`
    /// times.
    pub const fn new(
        start: Coordinate,
        total_distance_km: f64,
        step_count: usize,
        bearing_degrees: f64,
    ) -> Self {
        Self {
            start,
            total_distance_km,
            step_count,
            bearing_degrees,
            wrap_longitude: false,
        }
    }

    /// Creates a path description, validating every numeric input.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLatitude`] / [`Error::InvalidLongitude`] if `start`
    ///   is out of range.
    /// - [`Error::InvalidDistance`] if `total_distance_km` is negative or not
    ///   finite.
    /// - [`Error::InvalidBearing`] if `bearing_degrees` is not in `[0, 360)`.
    pub fn try_new(
        start: Coordinate,
        total_distance_km: f64,
        step_count: usize,
        bearing_degrees: f64,
    ) -> Result<Self> {
        let start = Coordinate::try_new(start.latitude, start.longitude)?;
        if !total_distance_km.is_finite() || total_distance_km < 0.0 {
            return Err(Error::InvalidDistance(total_distance_km));
        }
        if !bearing_degrees.is_finite() || !(0.0..360.0).contains(&bearing_degrees) {
            return Err(Error::InvalidBearing(bearing_degrees));
        }
        Ok(Self::new(start, total_distance_km, step_count, bearing_degrees))
    }

    /// Returns a copy that folds produced longitudes into `[-180, 180)`.
    #[must_use]
    pub const fn with_wrapped_longitude(mut self, wrap: bool) -> Self {
        self.wrap_longitude = wrap;
        self
    }

    /// Distance covered by a single hop, in kilometres.
    pub fn step_distance_km(&self) -> f64 {
        if self.step_count == 0 {
            0.0
        } else {
            self.total_distance_km / self.step_count as f64
        }
    }

    /// Returns the coordinate reached after hop `index` (zero based), or
    /// `None` past the end of the path.
    ///
    /// This replays the path from `start`, so it always agrees with the
    /// `index`-th item of [`generate`](Self::generate).
    ///
    /// # Example
    /// ```
    /// use roam::{Coordinate, PathGenerator, PathRequest};
    ///
    /// let request = PathRequest::new(Coordinate::new(0.0, 0.0), 3.0, 3, 45.0);
    /// assert_eq!(request.point_at(1), request.generate().nth(1));
    /// assert_eq!(request.point_at(3), None);
    /// ```
    pub fn point_at(&self, index: usize) -> Option<Coordinate> {
        self.generate().nth(index)
    }
}

impl PathGenerator for PathRequest {
    type Path = GreatCirclePath;

    /// Starts a new walk at `start`.
    ///
    /// # Example
    /// ```
    /// use roam::{Coordinate, PathGenerator, PathRequest};
    ///
    /// let request = PathRequest::new(Coordinate::new(12.9177, 77.6238), 10.0, 1500, 90.0);
    /// let first: Vec<_> = request.generate().take(3).collect();
    /// let again: Vec<_> = request.generate().take(3).collect();
    /// assert_eq!(first, again);
    /// ```
    fn generate(&self) -> Self::Path {
        GreatCirclePath {
            current: self.start,
            step_km: self.step_distance_km(),
            bearing_degrees: self.bearing_degrees,
            remaining: self.step_count,
            wrap_longitude: self.wrap_longitude,
        }
    }
}

/// A single walk along a [`PathRequest`].
///
/// Owns the running position and the number of hops left. Each call to
/// [`Iterator::next`] moves one hop along the bearing and yields the new
/// position; the start point itself is never yielded.
#[derive(Clone, Debug)]
pub struct GreatCirclePath {
    current: Coordinate,
    step_km: f64,
    bearing_degrees: f64,
    remaining: usize,
    wrap_longitude: bool,
}

impl GreatCirclePath {
    /// The most recently yielded point, or the start before the first hop.
    pub const fn position(&self) -> Coordinate {
        self.current
    }
}

impl Iterator for GreatCirclePath {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Coordinate> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let next = destination(self.current, self.bearing_degrees, self.step_km);
        self.current = if self.wrap_longitude {
            next.wrapped()
        } else {
            next
        };
        Some(self.current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for GreatCirclePath {}

impl FusedIterator for GreatCirclePath {}
