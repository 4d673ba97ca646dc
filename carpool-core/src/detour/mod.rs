//! Exact detour check against a travel-time matrix.
//!
//! For a trip and an optional prospective rider the evaluator builds the flat
//! coordinate list `[origin, destination, p1.pickup, p1.dropoff, ...]`, asks
//! the provider for one matrix covering every pair, and scores each valid
//! stop ordering as `origin -> stops... -> destination`. The minimum over all
//! orderings is the trip's optimal duration.
//!
//! Exhaustive enumeration is only tractable for a few riders, so the
//! evaluator refuses to plan more than [`DEFAULT_MAX_RIDERS`] unless
//! configured otherwise.

use std::time::Duration;

use geo::Coord;
use log::{debug, warn};
use thiserror::Error;

use crate::ordering::{StopPair, for_each_valid_ordering};
use crate::{RiderSegment, TravelTimeError, TravelTimeMatrix, TravelTimeProvider, Trip};

/// Most riders a single evaluation plans for by default.
///
/// Six riders already produce 7 484 400 orderings.
pub const DEFAULT_MAX_RIDERS: usize = 6;

const ORIGIN: usize = 0;
const DESTINATION: usize = 1;

/// Errors raised while planning a trip's stops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetourError {
    /// The travel-time lookup failed.
    #[error("travel-time lookup failed: {0}")]
    TravelTime(#[from] TravelTimeError),
    /// The provider returned a matrix that is not `expected × expected`.
    #[error("travel-time matrix has {rows} rows or ragged rows, expected {expected}x{expected}")]
    MatrixShape {
        /// Number of coordinates sent to the provider.
        expected: usize,
        /// Number of rows received.
        rows: usize,
    },
    /// Too many riders to enumerate every ordering.
    #[error("{riders} riders exceed the planning limit of {max}")]
    TooManyRiders {
        /// Riders in the evaluation, including any prospective rider.
        riders: usize,
        /// Configured limit.
        max: usize,
    },
}

/// Fastest stop sequence found for a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    /// Indices into [`PlannedRoute::points`], starting at the origin (`0`)
    /// and ending at the destination (`1`).
    pub stops: Vec<usize>,
    /// Coordinates the indices refer to.
    pub points: Vec<Coord<f64>>,
    /// Total duration of the sequence.
    pub total: Duration,
    /// Orderings scored to find it.
    pub orderings_evaluated: usize,
}

impl PlannedRoute {
    /// Coordinates of the stops in travel order.
    pub fn stop_coords(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.stops.iter().filter_map(|&idx| self.points.get(idx).copied())
    }

    /// Role of each stop in travel order.
    pub fn stop_kinds(&self) -> impl Iterator<Item = Stop> + '_ {
        self.stops.iter().map(|&idx| Stop::at(idx))
    }
}

/// Role of a stop within a [`PlannedRoute`].
///
/// Rider indices follow the trip's passenger list; a prospective rider comes
/// after every accepted passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// The driver's start point.
    Origin,
    /// The driver's end point.
    Destination,
    /// Where rider `n` boards.
    Pickup(usize),
    /// Where rider `n` leaves.
    Dropoff(usize),
}

impl Stop {
    const fn at(idx: usize) -> Self {
        match idx {
            ORIGIN => Self::Origin,
            DESTINATION => Self::Destination,
            _ => {
                let rider = (idx - 2) / 2;
                if idx % 2 == 0 {
                    Self::Pickup(rider)
                } else {
                    Self::Dropoff(rider)
                }
            }
        }
    }
}

/// Plans stop orderings using an injected [`TravelTimeProvider`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use carpool_core::{DetourEvaluator, Trip};
/// use carpool_core::test_support::HaversineTravelTimeProvider;
///
/// let trip = Trip::new(
///     "north",
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 0.0, y: 1.0 },
///     Duration::from_secs(3600),
///     10,
/// );
/// let evaluator = DetourEvaluator::new(HaversineTravelTimeProvider::default());
/// let feasible = evaluator.check_detour_feasible(
///     &trip,
///     Coord { x: 0.0, y: 0.5 },
///     Coord { x: 0.0, y: 0.6 },
/// )?;
/// assert!(feasible);
/// # Ok::<(), carpool_core::DetourError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DetourEvaluator<T> {
    provider: T,
    max_riders: usize,
}

impl<T: TravelTimeProvider> DetourEvaluator<T> {
    /// Create an evaluator with the default rider limit.
    pub const fn new(provider: T) -> Self {
        Self {
            provider,
            max_riders: DEFAULT_MAX_RIDERS,
        }
    }

    /// Override the rider limit.
    #[must_use]
    pub const fn with_max_riders(mut self, max_riders: usize) -> Self {
        self.max_riders = max_riders;
        self
    }

    /// Borrow the underlying provider.
    pub const fn provider(&self) -> &T {
        &self.provider
    }

    /// Find the fastest ordering serving every accepted passenger and, when
    /// given, one extra rider.
    ///
    /// # Errors
    ///
    /// Returns [`DetourError::TooManyRiders`] before any lookup when the rider
    /// count exceeds the limit, [`DetourError::TravelTime`] when the provider
    /// fails, and [`DetourError::MatrixShape`] when its matrix does not match
    /// the coordinate list.
    pub fn best_route(
        &self,
        trip: &Trip,
        extra: Option<&RiderSegment>,
    ) -> Result<PlannedRoute, DetourError> {
        let plan = StopPlan::new(trip, extra);
        let riders = plan.riders.len();
        if riders > self.max_riders {
            return Err(DetourError::TooManyRiders {
                riders,
                max: self.max_riders,
            });
        }

        let matrix = self.provider.get_travel_time_matrix(&plan.points)?;
        validate_shape(&matrix, plan.points.len())?;

        let mut best: Option<(Duration, Vec<usize>)> = None;
        let mut orderings_evaluated = 0_usize;
        for_each_valid_ordering(&plan.riders, |ordering| {
            orderings_evaluated += 1;
            let total = path_duration(&matrix, ordering);
            if best.as_ref().is_none_or(|(current, _)| total < *current) {
                best = Some((total, ordering.to_vec()));
            }
        });

        let (total, middle) = best.unwrap_or_else(|| {
            warn!(
                "trip {}: no ordering produced for {riders} riders; falling back to the direct leg",
                trip.id
            );
            debug_assert!(false, "enumerator yielded no ordering for trip {}", trip.id);
            (path_duration(&matrix, &[]), Vec::new())
        });

        debug!(
            "trip {}: {riders} riders, {orderings_evaluated} orderings, best {total:?}",
            trip.id
        );

        let mut stops = Vec::with_capacity(middle.len() + 2);
        stops.push(ORIGIN);
        stops.extend(middle);
        stops.push(DESTINATION);
        Ok(PlannedRoute {
            stops,
            points: plan.points,
            total,
            orderings_evaluated,
        })
    }

    /// Whether the trip can add a single-seat rider travelling from
    /// `rider_origin` to `rider_destination` within its detour budget.
    ///
    /// # Errors
    ///
    /// See [`DetourEvaluator::best_route`]. A failed lookup is an error rather
    /// than `false` so batch callers can tell "too far" from "unknown".
    pub fn check_detour_feasible(
        &self,
        trip: &Trip,
        rider_origin: Coord<f64>,
        rider_destination: Coord<f64>,
    ) -> Result<bool, DetourError> {
        let segment = RiderSegment::single(rider_origin, rider_destination);
        let route = self.best_route(trip, Some(&segment))?;
        let budget = trip.detour_budget();
        let feasible = route.total <= budget;
        debug!(
            "trip {}: best {:?} against budget {budget:?}, feasible: {feasible}",
            trip.id, route.total
        );
        Ok(feasible)
    }

    /// Fastest duration serving the trip's accepted passengers.
    ///
    /// A trip without passengers returns its base duration without a lookup.
    ///
    /// # Errors
    ///
    /// See [`DetourEvaluator::best_route`].
    pub fn recompute_optimal_duration(&self, trip: &Trip) -> Result<Duration, DetourError> {
        Ok(self.recompute_route(trip)?.total)
    }

    /// Fastest stop sequence serving the trip's accepted passengers.
    ///
    /// A trip without passengers drives straight from origin to destination
    /// in its base duration, without a lookup.
    ///
    /// # Errors
    ///
    /// See [`DetourEvaluator::best_route`].
    pub fn recompute_route(&self, trip: &Trip) -> Result<PlannedRoute, DetourError> {
        if trip.passengers.is_empty() {
            return Ok(PlannedRoute {
                stops: vec![ORIGIN, DESTINATION],
                points: vec![trip.origin, trip.destination],
                total: trip.base_duration,
                orderings_evaluated: 0,
            });
        }
        self.best_route(trip, None)
    }
}

/// [`DetourEvaluator::check_detour_feasible`] with a borrowed provider.
///
/// # Errors
///
/// See [`DetourEvaluator::best_route`].
pub fn check_detour_feasible<T: TravelTimeProvider + ?Sized>(
    provider: &T,
    trip: &Trip,
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
) -> Result<bool, DetourError> {
    DetourEvaluator::new(provider).check_detour_feasible(trip, rider_origin, rider_destination)
}

/// [`DetourEvaluator::recompute_optimal_duration`] with a borrowed provider.
///
/// # Errors
///
/// See [`DetourEvaluator::best_route`].
pub fn recompute_optimal_duration<T: TravelTimeProvider + ?Sized>(
    provider: &T,
    trip: &Trip,
) -> Result<Duration, DetourError> {
    DetourEvaluator::new(provider).recompute_optimal_duration(trip)
}

/// Flat coordinate list and the rider index pairs within it.
struct StopPlan {
    points: Vec<Coord<f64>>,
    riders: Vec<StopPair>,
}

impl StopPlan {
    fn new(trip: &Trip, extra: Option<&RiderSegment>) -> Self {
        let segments: Vec<&RiderSegment> = trip.segments().chain(extra).collect();
        let mut points = Vec::with_capacity(2 + segments.len() * 2);
        points.push(trip.origin);
        points.push(trip.destination);
        let mut riders = Vec::with_capacity(segments.len());
        for segment in segments {
            let pickup = points.len();
            points.push(segment.pickup);
            points.push(segment.dropoff);
            riders.push(StopPair::new(pickup, pickup + 1));
        }
        Self { points, riders }
    }
}

fn validate_shape(matrix: &TravelTimeMatrix, expected: usize) -> Result<(), DetourError> {
    if matrix.len() == expected && matrix.iter().all(|row| row.len() == expected) {
        return Ok(());
    }
    warn!(
        "travel-time matrix shape mismatch: {} rows for {expected} coordinates",
        matrix.len()
    );
    Err(DetourError::MatrixShape {
        expected,
        rows: matrix.len(),
    })
}

/// Duration of `origin -> ordering... -> destination`.
///
/// Saturates, so an unreachable leg makes the path `Duration::MAX`.
fn path_duration(matrix: &TravelTimeMatrix, ordering: &[usize]) -> Duration {
    let mut total = Duration::ZERO;
    let mut prev = ORIGIN;
    for &next in ordering.iter().chain(std::iter::once(&DESTINATION)) {
        total = total.saturating_add(leg(matrix, prev, next));
        prev = next;
    }
    total
}

fn leg(matrix: &TravelTimeMatrix, from: usize, to: usize) -> Duration {
    matrix
        .get(from)
        .and_then(|row| row.get(to))
        .copied()
        .unwrap_or(Duration::MAX)
}
