//! Provider traits and the adjacency-matrix alias.

use std::time::Duration;

use geo::Coord;

use super::error::TravelTimeError;

/// Adjacency matrix of travel times.
///
/// `Duration::MAX` marks a pair the provider could not route. Callers sum
/// legs with saturating arithmetic so an unreachable leg makes the whole path
/// infeasible instead of overflowing.
pub type TravelTimeMatrix = Vec<Vec<Duration>>;

/// Fetch pairwise travel times for a set of coordinates.
///
/// Implementers must return a square `n×n` matrix where
/// `n == coords.len()`. `matrix[i][j]` is the travel time from `coords[i]` to
/// `coords[j]`.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use geo::Coord;
/// use carpool_core::{TravelTimeError, TravelTimeMatrix, TravelTimeProvider};
///
/// struct UnitProvider;
///
/// impl TravelTimeProvider for UnitProvider {
///     fn get_travel_time_matrix(
///         &self,
///         coords: &[Coord<f64>],
///     ) -> Result<TravelTimeMatrix, TravelTimeError> {
///         if coords.is_empty() {
///             return Err(TravelTimeError::EmptyInput);
///         }
///         let n = coords.len();
///         Ok((0..n)
///             .map(|i| {
///                 (0..n)
///                     .map(|j| if i == j { Duration::ZERO } else { Duration::from_secs(1) })
///                     .collect::<Vec<_>>()
///             })
///             .collect())
///     }
/// }
///
/// let matrix = UnitProvider.get_travel_time_matrix(&[Coord { x: 0.0, y: 0.0 }])?;
/// assert_eq!(matrix.len(), 1);
/// # Ok::<(), TravelTimeError>(())
/// ```
pub trait TravelTimeProvider {
    /// Return a matrix of travel times for `coords`.
    ///
    /// Implementations must return `Err(TravelTimeError::EmptyInput)` when
    /// `coords` is empty.
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError>;
}

/// Fetch the driving duration of a single origin-destination pair.
pub trait RouteDurationProvider {
    /// Return the fastest known duration from `origin` to `destination`.
    ///
    /// Implementations return [`TravelTimeError::NoRoute`] when the service
    /// cannot connect the two points.
    fn get_route_duration(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<Duration, TravelTimeError>;
}

impl<T: TravelTimeProvider + ?Sized> TravelTimeProvider for &T {
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        (**self).get_travel_time_matrix(coords)
    }
}

impl<T: TravelTimeProvider + ?Sized> TravelTimeProvider for Box<T> {
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        (**self).get_travel_time_matrix(coords)
    }
}

impl<T: RouteDurationProvider + ?Sized> RouteDurationProvider for &T {
    fn get_route_duration(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<Duration, TravelTimeError> {
        (**self).get_route_duration(origin, destination)
    }
}

impl<T: RouteDurationProvider + ?Sized> RouteDurationProvider for Box<T> {
    fn get_route_duration(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<Duration, TravelTimeError> {
        (**self).get_route_duration(origin, destination)
    }
}
