//! Route-aware matching of a rider against a trip's road geometry.
//!
//! Trips carrying a polyline are checked in order for direction agreement,
//! pickup proximity, dropoff proximity and travel order along the route; the
//! first failing check decides. Legacy trips without usable geometry fall back
//! to endpoint proximity. Nothing here performs a lookup and every input
//! yields a verdict.

use geo::{Coord, LineString};
use log::debug;

use crate::Trip;
use crate::geometry::{
    PolylineProjection, bearing, bearing_difference, distance_along_polyline, haversine_distance,
    point_to_polyline_distance,
};

/// Default proximity threshold in kilometres.
pub const DEFAULT_THRESHOLD_KM: f64 = 2.0;

/// Largest bearing difference, in degrees, still considered the same
/// direction.
pub const MAX_BEARING_DIFFERENCE_DEG: f64 = 90.0;

/// Verdict of [`evaluate_route_match`], naming the deciding check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RouteMatch {
    /// Every route check passed.
    Matched,
    /// Legacy trip whose endpoints are both within the threshold.
    LegacyMatched,
    /// Rider and trip head in directions more than 90° apart.
    WrongDirection,
    /// The rider's origin is too far from the route.
    PickupOffRoute,
    /// The rider's destination is too far from the route.
    DropoffOffRoute,
    /// The rider would travel against the route.
    WrongOrder,
    /// Legacy trip whose endpoints are too far from the rider's.
    LegacyTooFar,
}

impl RouteMatch {
    /// Whether the trip should be offered to the rider.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Matched | Self::LegacyMatched)
    }
}

/// Decide whether `trip` suits a rider and say which check decided.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use geo::{Coord, LineString};
/// use carpool_core::Trip;
/// use carpool_core::matcher::{DEFAULT_THRESHOLD_KM, RouteMatch, evaluate_route_match};
///
/// let trip = Trip::new(
///     "north",
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 0.0, y: 1.0 },
///     Duration::from_secs(3600),
///     10,
/// )
/// .with_route(LineString::from(vec![(0.0, 0.0), (0.0, 1.0)]));
///
/// let verdict = evaluate_route_match(
///     Coord { x: 0.0, y: 0.6 },
///     Coord { x: 0.0, y: 0.5 },
///     &trip,
///     DEFAULT_THRESHOLD_KM,
/// );
/// assert_eq!(verdict, RouteMatch::WrongDirection);
/// ```
#[must_use]
pub fn evaluate_route_match(
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
    trip: &Trip,
    threshold_km: f64,
) -> RouteMatch {
    let verdict = match trip.usable_route() {
        Some(route) => {
            on_route(rider_origin, rider_destination, trip, route, threshold_km)
                .unwrap_or_else(|| legacy(rider_origin, rider_destination, trip, threshold_km))
        }
        None => legacy(rider_origin, rider_destination, trip, threshold_km),
    };
    debug!("trip {}: route match {verdict:?}", trip.id);
    verdict
}

/// Whether `trip` suits a rider travelling from `rider_origin` to
/// `rider_destination`.
#[must_use]
pub fn match_route(
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
    trip: &Trip,
    threshold_km: f64,
) -> bool {
    evaluate_route_match(rider_origin, rider_destination, trip, threshold_km).is_match()
}

/// Trips from `trips` that match the rider, in input order.
#[must_use]
pub fn find_matching_trips<'a>(
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
    trips: &'a [Trip],
    threshold_km: f64,
) -> Vec<&'a Trip> {
    trips
        .iter()
        .filter(|trip| match_route(rider_origin, rider_destination, trip, threshold_km))
        .collect()
}

/// Route checks; `None` when the geometry cannot be projected onto.
fn on_route(
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
    trip: &Trip,
    route: &LineString<f64>,
    threshold_km: f64,
) -> Option<RouteMatch> {
    let rider_bearing = bearing(rider_origin, rider_destination);
    let trip_bearing = bearing(trip.origin, trip.destination);
    if bearing_difference(rider_bearing, trip_bearing) > MAX_BEARING_DIFFERENCE_DEG {
        return Some(RouteMatch::WrongDirection);
    }

    let pickup = point_to_polyline_distance(rider_origin, route).ok()?;
    if pickup.distance_km > threshold_km {
        return Some(RouteMatch::PickupOffRoute);
    }

    let dropoff = point_to_polyline_distance(rider_destination, route).ok()?;
    if dropoff.distance_km > threshold_km {
        return Some(RouteMatch::DropoffOffRoute);
    }

    if along(route, pickup) < along(route, dropoff) {
        Some(RouteMatch::Matched)
    } else {
        Some(RouteMatch::WrongOrder)
    }
}

fn along(route: &LineString<f64>, projection: PolylineProjection) -> f64 {
    distance_along_polyline(route, projection.segment_index, projection.fraction)
}

fn legacy(
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
    trip: &Trip,
    threshold_km: f64,
) -> RouteMatch {
    let near_origin = haversine_distance(rider_origin, trip.origin) <= threshold_km;
    let near_destination = haversine_distance(rider_destination, trip.destination) <= threshold_km;
    if near_origin && near_destination {
        RouteMatch::LegacyMatched
    } else {
        RouteMatch::LegacyTooFar
    }
}
