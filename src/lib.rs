//! Facade crate for the carpool matching engine.
//!
//! This crate re-exports the core matching and detour types and exposes the
//! HTTP routing providers behind the `routing-http` feature.

#![forbid(unsafe_code)]

pub use carpool_core::{
    DetourError, DetourEvaluator, GeometryError, LifecycleError, Passenger, PlannedRoute,
    RiderSegment, RiderSegmentError, RouteDurationProvider, RouteMatch, SearchOutcome,
    SearchStats, Stop, StopPair, TravelTimeError, TravelTimeMatrix, TravelTimeProvider, Trip,
    TripDraft, TripFailure, check_detour_feasible, find_matching_trips, match_route, prefilter,
    recompute_optimal_duration, search_trips,
};

#[cfg(feature = "routing-http")]
pub use carpool_data::routing::{
    HttpTravelTimeProvider, HttpTravelTimeProviderConfig, ProviderBuildError,
};
