//! Test utilities for routing providers.
//!
//! This module provides [`StubTravelTimeProvider`], a deterministic test double
//! for both travel-time capabilities that returns pre-configured responses
//! without making HTTP requests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use carpool_core::{RouteDurationProvider, TravelTimeError, TravelTimeMatrix, TravelTimeProvider};
use geo::Coord;

/// Stub provider for testing.
///
/// Matrix and route-duration responses are configured independently. Every
/// request is counted so tests can assert that no lookup took place.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use carpool_data::routing::test_support::StubTravelTimeProvider;
/// use carpool_core::{RouteDurationProvider, TravelTimeProvider};
/// use geo::Coord;
///
/// let provider = StubTravelTimeProvider::with_unit_matrix(2)
///     .with_route_duration(Duration::from_secs(600));
///
/// let coords = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }];
/// assert!(provider.get_travel_time_matrix(&coords).is_ok());
/// assert_eq!(
///     provider.get_route_duration(coords[0], coords[1]),
///     Ok(Duration::from_secs(600)),
/// );
/// assert_eq!(provider.calls(), 2);
/// ```
#[derive(Debug)]
pub struct StubTravelTimeProvider {
    matrix: Result<TravelTimeMatrix, TravelTimeError>,
    route: Result<Duration, TravelTimeError>,
    calls: AtomicUsize,
}

impl StubTravelTimeProvider {
    fn new(matrix: Result<TravelTimeMatrix, TravelTimeError>) -> Self {
        Self {
            matrix,
            route: Err(TravelTimeError::NoRoute),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a provider that returns the given matrix.
    ///
    /// The matrix is returned regardless of the coordinates provided, as long
    /// as the input is non-empty.
    #[must_use]
    pub fn with_matrix(matrix: TravelTimeMatrix) -> Self {
        Self::new(Ok(matrix))
    }

    /// Create a provider whose every request fails with `error`.
    ///
    /// Empty matrix input still returns `TravelTimeError::EmptyInput`.
    #[must_use]
    pub fn with_error(error: TravelTimeError) -> Self {
        let mut stub = Self::new(Err(error.clone()));
        stub.route = Err(error);
        stub
    }

    /// Create a provider returning a unit matrix of the given size.
    ///
    /// The matrix has zero on the diagonal and one second elsewhere.
    #[must_use]
    pub fn with_unit_matrix(size: usize) -> Self {
        Self::with_matrix(build_unit_matrix(size))
    }

    /// Answer route-duration queries with `duration`.
    ///
    /// Without this, route queries fail with `TravelTimeError::NoRoute`.
    #[must_use]
    pub fn with_route_duration(mut self, duration: Duration) -> Self {
        self.route = Ok(duration);
        self
    }

    /// Number of requests served so far, of either kind.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn build_unit_matrix(size: usize) -> TravelTimeMatrix {
    (0..size)
        .map(|i| {
            (0..size)
                .map(|j| {
                    if i == j {
                        Duration::ZERO
                    } else {
                        Duration::from_secs(1)
                    }
                })
                .collect()
        })
        .collect()
}

impl TravelTimeProvider for StubTravelTimeProvider {
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if coords.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        self.matrix.clone()
    }
}

impl RouteDurationProvider for StubTravelTimeProvider {
    fn get_route_duration(
        &self,
        _origin: Coord<f64>,
        _destination: Coord<f64>,
    ) -> Result<Duration, TravelTimeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.route.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_coords(count: usize) -> Vec<Coord<f64>> {
        (0..count)
            .map(|i| Coord {
                x: i as f64,
                y: 0.0,
            })
            .collect()
    }

    #[rstest]
    fn with_matrix_returns_configured_matrix() {
        let matrix = vec![
            vec![Duration::ZERO, Duration::from_secs(60)],
            vec![Duration::from_secs(60), Duration::ZERO],
        ];
        let provider = StubTravelTimeProvider::with_matrix(matrix.clone());

        let result = provider
            .get_travel_time_matrix(&sample_coords(2))
            .expect("should succeed");

        assert_eq!(result, matrix);
        assert_eq!(provider.calls(), 1);
    }

    #[rstest]
    fn with_error_fails_both_capabilities() {
        let provider = StubTravelTimeProvider::with_error(TravelTimeError::NetworkError {
            url: "http://example.com".to_string(),
            message: "connection refused".to_string(),
        });

        let matrix_err = provider
            .get_travel_time_matrix(&sample_coords(2))
            .expect_err("should fail");
        let route_err = provider
            .get_route_duration(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 })
            .expect_err("should fail");

        assert!(matches!(matrix_err, TravelTimeError::NetworkError { .. }));
        assert_eq!(matrix_err, route_err);
    }

    #[rstest]
    fn empty_input_returns_empty_input_error() {
        let provider = StubTravelTimeProvider::with_unit_matrix(2);

        let err = provider
            .get_travel_time_matrix(&[])
            .expect_err("should fail");

        assert_eq!(err, TravelTimeError::EmptyInput);
    }

    #[rstest]
    fn unit_matrix_has_zero_diagonal() {
        let provider = StubTravelTimeProvider::with_unit_matrix(3);

        let matrix = provider
            .get_travel_time_matrix(&sample_coords(3))
            .expect("should succeed");

        for (i, row) in matrix.iter().enumerate() {
            for (j, &cell) in row.iter().enumerate() {
                let expected = if i == j {
                    Duration::ZERO
                } else {
                    Duration::from_secs(1)
                };
                assert_eq!(cell, expected);
            }
        }
    }

    #[rstest]
    fn route_defaults_to_no_route() {
        let provider = StubTravelTimeProvider::with_unit_matrix(2);
        assert_eq!(
            provider.get_route_duration(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }),
            Err(TravelTimeError::NoRoute)
        );
    }
}
