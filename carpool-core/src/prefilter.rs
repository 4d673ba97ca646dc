//! Cheap bounding-box rejection of trips before any travel-time lookup.
//!
//! The box spans a trip's origin and destination, grown by a padding in
//! degrees on every side. False positives are expected and removed later by
//! the detour evaluator; false negatives are bounded by the padding.

use geo::{Coord, Intersects, Rect};

use crate::Trip;

/// Default padding in degrees, roughly 5 km at mid latitudes.
pub const DEFAULT_PADDING_DEG: f64 = 0.045;

/// Build the padded box spanned by two anchors.
#[must_use]
pub fn padded_box(anchor1: Coord<f64>, anchor2: Coord<f64>, padding_deg: f64) -> Rect<f64> {
    let bounds = Rect::new(anchor1, anchor2);
    let min = bounds.min();
    let max = bounds.max();
    Rect::new(
        Coord {
            x: min.x - padding_deg,
            y: min.y - padding_deg,
        },
        Coord {
            x: max.x + padding_deg,
            y: max.y + padding_deg,
        },
    )
}

/// Whether `point` lies inside the padded box spanned by the anchors.
///
/// Points on the boundary count as inside.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use carpool_core::prefilter::{DEFAULT_PADDING_DEG, is_within_bounding_box};
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let destination = Coord { x: 0.0, y: 1.0 };
/// assert!(is_within_bounding_box(origin, origin, destination, DEFAULT_PADDING_DEG));
/// let east = Coord { x: 0.1, y: 0.5 };
/// assert!(!is_within_bounding_box(east, origin, destination, DEFAULT_PADDING_DEG));
/// ```
#[must_use]
pub fn is_within_bounding_box(
    point: Coord<f64>,
    anchor1: Coord<f64>,
    anchor2: Coord<f64>,
    padding_deg: f64,
) -> bool {
    // `Intersects` treats boundary points as inside the rectangle.
    padded_box(anchor1, anchor2, padding_deg).intersects(&point)
}

/// Keep trips whose padded box contains both rider endpoints.
///
/// Uses [`DEFAULT_PADDING_DEG`]; input order is preserved.
#[must_use]
pub fn prefilter<'a>(
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
    trips: &'a [Trip],
) -> Vec<&'a Trip> {
    prefilter_with_padding(rider_origin, rider_destination, trips, DEFAULT_PADDING_DEG)
}

/// [`prefilter`] with an explicit padding.
#[must_use]
pub fn prefilter_with_padding<'a>(
    rider_origin: Coord<f64>,
    rider_destination: Coord<f64>,
    trips: &'a [Trip],
    padding_deg: f64,
) -> Vec<&'a Trip> {
    trips
        .iter()
        .filter(|trip| {
            let bbox = padded_box(trip.origin, trip.destination, padding_deg);
            bbox.intersects(&rider_origin) && bbox.intersects(&rider_destination)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    const ORIGIN: Coord<f64> = Coord { x: 0.0, y: 0.0 };
    const DESTINATION: Coord<f64> = Coord { x: 0.0, y: 1.0 };

    #[fixture]
    fn trips() -> Vec<Trip> {
        vec![
            Trip::new("north", ORIGIN, DESTINATION, Duration::from_secs(3600), 10),
            Trip::new(
                "east",
                Coord { x: 5.0, y: 5.0 },
                Coord { x: 6.0, y: 5.0 },
                Duration::from_secs(3600),
                10,
            ),
        ]
    }

    #[rstest]
    #[case(ORIGIN)]
    #[case(DESTINATION)]
    fn anchors_are_always_inside(#[case] point: Coord<f64>) {
        assert!(is_within_bounding_box(point, ORIGIN, DESTINATION, 0.0));
        assert!(is_within_bounding_box(point, DESTINATION, ORIGIN, DEFAULT_PADDING_DEG));
    }

    #[rstest]
    #[case(Coord { x: DEFAULT_PADDING_DEG + 1e-6, y: 0.5 })]
    #[case(Coord { x: -DEFAULT_PADDING_DEG - 1e-6, y: 0.5 })]
    #[case(Coord { x: 0.0, y: 1.0 + DEFAULT_PADDING_DEG + 1e-6 })]
    #[case(Coord { x: 0.0, y: -DEFAULT_PADDING_DEG - 1e-6 })]
    fn points_beyond_padding_are_outside(#[case] point: Coord<f64>) {
        assert!(!is_within_bounding_box(point, ORIGIN, DESTINATION, DEFAULT_PADDING_DEG));
    }

    #[rstest]
    fn points_within_padding_are_inside() {
        let point = Coord {
            x: DEFAULT_PADDING_DEG - 1e-6,
            y: -DEFAULT_PADDING_DEG + 1e-6,
        };
        assert!(is_within_bounding_box(point, ORIGIN, DESTINATION, DEFAULT_PADDING_DEG));
    }

    #[rstest]
    fn prefilter_requires_both_endpoints(trips: Vec<Trip>) {
        let kept = prefilter(Coord { x: 0.0, y: 0.2 }, Coord { x: 0.01, y: 0.9 }, &trips);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "north");

        let half_out = prefilter(Coord { x: 0.0, y: 0.2 }, Coord { x: 5.5, y: 5.0 }, &trips);
        assert!(half_out.is_empty());
    }
}
