//! Spherical geometry helpers for matching riders against trip routes.
//!
//! All distances are kilometres on a sphere of radius [`EARTH_RADIUS_KM`].
//! Projection onto a segment treats the segment as locally flat, scaling the
//! longitude delta by the cosine of the segment's mean latitude, and then
//! measures the true great-circle distance to the projected point.

use geo::{Coord, LineString};
use thiserror::Error;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors raised by polyline helpers that need at least one segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The polyline has fewer than two points and therefore no segment.
    #[error("polyline needs at least 2 points, found {points}")]
    PolylineTooShort {
        /// Number of points supplied.
        points: usize,
    },
}

/// Closest point on a single segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Great-circle distance from the query point to the projection.
    pub distance_km: f64,
    /// Position of the projection along the segment, clamped to `[0, 1]`.
    pub fraction: f64,
}

/// Closest point on a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineProjection {
    /// Great-circle distance from the query point to the projection.
    pub distance_km: f64,
    /// Index of the segment holding the projection; segment `i` joins
    /// points `i` and `i + 1`.
    pub segment_index: usize,
    /// Position of the projection along that segment, in `[0, 1]`.
    pub fraction: f64,
}

/// Great-circle distance between two coordinates in kilometres.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use carpool_core::geometry::haversine_distance;
///
/// let one_degree = haversine_distance(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
/// assert!((one_degree - 111.195).abs() < 1e-3);
/// ```
#[must_use]
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.y.to_radians().cos() * b.y.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Project `point` onto the segment `start`–`end`.
///
/// The projection never extrapolates past either endpoint. A zero-length
/// segment yields a fraction of zero and the distance to `start`.
#[must_use]
pub fn point_to_segment_distance(
    point: Coord<f64>,
    start: Coord<f64>,
    end: Coord<f64>,
) -> SegmentProjection {
    let cos_lat = ((start.y + end.y) / 2.0).to_radians().cos();
    let px = (point.x - start.x) * cos_lat;
    let py = point.y - start.y;
    let sx = (end.x - start.x) * cos_lat;
    let sy = end.y - start.y;

    let len_sq = sx * sx + sy * sy;
    let fraction = if len_sq > 0.0 {
        ((px * sx + py * sy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let projected = Coord {
        x: start.x + fraction * (end.x - start.x),
        y: start.y + fraction * (end.y - start.y),
    };
    SegmentProjection {
        distance_km: haversine_distance(point, projected),
        fraction,
    }
}

/// Find the segment of `polyline` closest to `point`.
///
/// Ties keep the earliest segment.
///
/// # Errors
///
/// Returns [`GeometryError::PolylineTooShort`] when the polyline has fewer
/// than two points. Callers matching trips should treat this as "no route
/// geometry" and fall back to endpoint proximity.
pub fn point_to_polyline_distance(
    point: Coord<f64>,
    polyline: &LineString<f64>,
) -> Result<PolylineProjection, GeometryError> {
    let mut best: Option<PolylineProjection> = None;
    for (segment_index, segment) in polyline.lines().enumerate() {
        let projection = point_to_segment_distance(point, segment.start, segment.end);
        if best.is_none_or(|current| projection.distance_km < current.distance_km) {
            best = Some(PolylineProjection {
                distance_km: projection.distance_km,
                segment_index,
                fraction: projection.fraction,
            });
        }
    }
    best.ok_or(GeometryError::PolylineTooShort {
        points: polyline.0.len(),
    })
}

/// Distance travelled along `polyline` up to a projected position.
///
/// Sums every full segment before `segment_index` and adds `fraction` of
/// segment `segment_index`. An index past the last segment only counts the
/// segments that exist.
#[must_use]
pub fn distance_along_polyline(
    polyline: &LineString<f64>,
    segment_index: usize,
    fraction: f64,
) -> f64 {
    let mut segments = polyline.lines();
    let before: f64 = segments
        .by_ref()
        .take(segment_index)
        .map(|segment| haversine_distance(segment.start, segment.end))
        .sum();
    segments.next().map_or(before, |segment| {
        before + fraction * haversine_distance(segment.start, segment.end)
    })
}

/// Initial compass bearing from `a` to `b` in degrees, within `[0, 360)`.
#[must_use]
pub fn bearing(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let d_lon = (b.x - a.x).to_radians();
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Smallest angle between two bearings, within `[0, 180]`.
#[must_use]
pub fn bearing_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    if diff > 180.0 { 360.0 - diff } else { diff }
}
