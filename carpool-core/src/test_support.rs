//! Deterministic providers used by unit, behaviour and property tests.
//!
//! None of these touch the network. The counting providers record how many
//! times they were asked so tests can assert that no lookup happened.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use geo::Coord;

use crate::geometry::haversine_distance;
use crate::{RouteDurationProvider, TravelTimeError, TravelTimeMatrix, TravelTimeProvider};

/// Deterministic `TravelTimeProvider` returning one-second edges.
#[derive(Default, Debug, Copy, Clone)]
pub struct UnitTravelTimeProvider;

impl TravelTimeProvider for UnitTravelTimeProvider {
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        if coords.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        let n = coords.len();
        let mut matrix = vec![vec![Duration::from_secs(1); n]; n];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = Duration::ZERO;
        }
        Ok(matrix)
    }
}

/// Straight-line travel at a constant speed.
///
/// Great-circle distances obey the triangle inequality, so a stop lying on
/// the straight path between two others adds no time. That makes the
/// provider convenient for on-path versus off-path scenarios.
#[derive(Debug, Copy, Clone)]
pub struct HaversineTravelTimeProvider {
    /// Constant speed in kilometres per hour.
    pub speed_kmh: f64,
}

impl HaversineTravelTimeProvider {
    /// Speed at which one degree of latitude takes exactly one hour.
    pub const DEGREE_PER_HOUR_KMH: f64 = 111.194_926_644_558_73;

    /// Create a provider travelling at `speed_kmh`.
    #[must_use]
    pub const fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    fn duration(&self, a: Coord<f64>, b: Coord<f64>) -> Duration {
        let hours = haversine_distance(a, b) / self.speed_kmh;
        Duration::try_from_secs_f64(hours * 3600.0).unwrap_or(Duration::MAX)
    }
}

impl Default for HaversineTravelTimeProvider {
    fn default() -> Self {
        Self::new(Self::DEGREE_PER_HOUR_KMH)
    }
}

impl TravelTimeProvider for HaversineTravelTimeProvider {
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        if coords.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        Ok(coords
            .iter()
            .map(|&from| coords.iter().map(|&to| self.duration(from, to)).collect())
            .collect())
    }
}

impl RouteDurationProvider for HaversineTravelTimeProvider {
    fn get_route_duration(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<Duration, TravelTimeError> {
        Ok(self.duration(origin, destination))
    }
}

/// Replays a fixed result and counts calls.
///
/// The matrix is returned as-is regardless of the coordinates, which lets
/// tests feed malformed shapes to the evaluator.
#[derive(Debug)]
pub struct MatrixTravelTimeProvider {
    response: Result<TravelTimeMatrix, TravelTimeError>,
    calls: AtomicUsize,
}

impl MatrixTravelTimeProvider {
    /// Always answer with `matrix`.
    #[must_use]
    pub const fn new(matrix: TravelTimeMatrix) -> Self {
        Self {
            response: Ok(matrix),
            calls: AtomicUsize::new(0),
        }
    }

    /// Build a matrix from whole seconds.
    #[must_use]
    pub fn from_secs(rows: &[&[u64]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|&secs| Duration::from_secs(secs)).collect())
                .collect(),
        )
    }

    /// Always fail with `error`.
    #[must_use]
    pub const fn failing(error: TravelTimeError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of matrix requests served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TravelTimeProvider for MatrixTravelTimeProvider {
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if coords.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        self.response.clone()
    }
}

/// Wraps another provider and fails whenever the first coordinate equals
/// `origin`.
///
/// Batch tests use it to make one trip's lookup fail while the rest succeed.
#[derive(Debug, Clone)]
pub struct FailOnOrigin<P> {
    /// Provider answering every other request.
    pub inner: P,
    /// Trip origin whose requests fail.
    pub origin: Coord<f64>,
    /// Error returned for the failing origin.
    pub error: TravelTimeError,
}

impl<P: TravelTimeProvider> TravelTimeProvider for FailOnOrigin<P> {
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        if coords.first() == Some(&self.origin) {
            return Err(self.error.clone());
        }
        self.inner.get_travel_time_matrix(coords)
    }
}

/// Answers every route-duration query with the same result.
#[derive(Debug)]
pub struct FixedRouteDurationProvider {
    response: Result<Duration, TravelTimeError>,
    calls: AtomicUsize,
}

impl FixedRouteDurationProvider {
    /// Always answer with `duration`.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            response: Ok(duration),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub const fn failing(error: TravelTimeError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of queries served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteDurationProvider for FixedRouteDurationProvider {
    fn get_route_duration(
        &self,
        _origin: Coord<f64>,
        _destination: Coord<f64>,
    ) -> Result<Duration, TravelTimeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}
