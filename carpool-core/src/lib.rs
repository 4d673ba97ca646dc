//! Core matching and detour logic for the carpool engine.
//!
//! The crate decides which existing trips a prospective rider could join.
//! Cheap geometric checks ([`prefilter`], [`match_route`]) run first and never
//! touch the network. The exact check ([`DetourEvaluator`]) asks an injected
//! [`TravelTimeProvider`] for a travel-time matrix, enumerates every valid
//! pickup/dropoff ordering and compares the fastest one against the driver's
//! detour allowance.
//!
//! Coordinates are [`geo::Coord`] values with `x` as longitude and `y` as
//! latitude, both in WGS-84 degrees.

#![forbid(unsafe_code)]

pub mod detour;
pub mod geometry;
pub mod lifecycle;
pub mod matcher;
pub mod ordering;
pub mod prefilter;
pub mod search;
#[doc(hidden)]
pub mod test_support;
pub mod travel_time;
mod trip;

pub use detour::{
    DEFAULT_MAX_RIDERS, DetourError, DetourEvaluator, PlannedRoute, Stop, check_detour_feasible,
    recompute_optimal_duration,
};
pub use geometry::{GeometryError, PolylineProjection, SegmentProjection};
pub use lifecycle::{LifecycleError, TripDraft};
pub use matcher::{RouteMatch, find_matching_trips, match_route};
pub use ordering::StopPair;
pub use prefilter::prefilter;
pub use search::{SearchOutcome, SearchStats, TripFailure, search_trips};
pub use travel_time::{
    RouteDurationProvider, TravelTimeError, TravelTimeMatrix, TravelTimeProvider,
};
pub use trip::{Passenger, RiderSegment, RiderSegmentError, Trip};
