//! Batch search for trips a rider could join.
//!
//! The pipeline runs the cheap filters first: the bounding-box prefilter, then
//! the seat check, and only then the detour evaluator, which costs one
//! travel-time lookup per surviving trip. A failed lookup only removes its own
//! trip from the result; the rest of the batch is still evaluated.

use geo::Coord;
use log::{info, warn};

use crate::prefilter::prefilter;
use crate::{DetourError, DetourEvaluator, TravelTimeProvider, Trip};

/// A trip whose detour check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripFailure {
    /// Identifier of the failing trip.
    pub trip_id: String,
    /// Why the check failed.
    pub error: DetourError,
}

/// Candidate counts after each stage of [`search_trips`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Trips supplied.
    pub considered: usize,
    /// Trips whose padded box holds both rider points.
    pub in_bounding_box: usize,
    /// Of those, trips with a free seat.
    pub with_free_seat: usize,
    /// Of those, trips within their detour budget.
    pub feasible: usize,
    /// Trips whose detour check failed.
    pub failed: usize,
}

/// Result of [`search_trips`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<'a> {
    /// Trips the rider can join, in input order.
    pub feasible: Vec<&'a Trip>,
    /// Trips skipped because their check failed.
    pub failures: Vec<TripFailure>,
    /// Per-stage counts.
    pub stats: SearchStats,
}

/// Find the trips a single-seat rider could join.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use carpool_core::{DetourEvaluator, Trip, search_trips};
/// use carpool_core::test_support::HaversineTravelTimeProvider;
///
/// let trips = vec![Trip::new(
///     "north",
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 0.0, y: 1.0 },
///     Duration::from_secs(3600),
///     10,
/// )];
/// let evaluator = DetourEvaluator::new(HaversineTravelTimeProvider::default());
/// let outcome = search_trips(
///     &evaluator,
///     Coord { x: 0.0, y: 0.5 },
///     Coord { x: 0.0, y: 0.6 },
///     &trips,
/// );
/// assert_eq!(outcome.feasible.len(), 1);
/// assert!(outcome.failures.is_empty());
/// ```
pub fn search_trips<'a, T: TravelTimeProvider>(
    evaluator: &DetourEvaluator<T>,
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
    trips: &'a [Trip],
) -> SearchOutcome<'a> {
    let mut stats = SearchStats {
        considered: trips.len(),
        ..SearchStats::default()
    };

    let boxed = prefilter(rider_origin, rider_destination, trips);
    stats.in_bounding_box = boxed.len();

    let seated: Vec<&Trip> = boxed.into_iter().filter(|trip| trip.has_seats_for(1)).collect();
    stats.with_free_seat = seated.len();

    let mut feasible = Vec::new();
    let mut failures = Vec::new();
    for trip in seated {
        match evaluator.check_detour_feasible(trip, rider_origin, rider_destination) {
            Ok(true) => feasible.push(trip),
            Ok(false) => {}
            Err(error) => {
                warn!("skipping trip {}: {error}", trip.id);
                failures.push(TripFailure {
                    trip_id: trip.id.clone(),
                    error,
                });
            }
        }
    }
    stats.feasible = feasible.len();
    stats.failed = failures.len();

    info!(
        "search: {} trips, {} in box, {} with seats, {} feasible, {} failed",
        stats.considered, stats.in_bounding_box, stats.with_free_seat, stats.feasible, stats.failed
    );

    SearchOutcome {
        feasible,
        failures,
        stats,
    }
}
