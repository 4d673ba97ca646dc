//! Trips, their passengers and the rider segments fed to the evaluator.

use std::time::Duration;

use geo::{Coord, LineString};
use thiserror::Error;

/// A pickup/dropoff pair for one rider.
///
/// Segments are rebuilt for every evaluation from a trip's passenger list
/// plus, optionally, one prospective rider.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use carpool_core::RiderSegment;
///
/// # fn main() -> Result<(), carpool_core::RiderSegmentError> {
/// let segment = RiderSegment::new(Coord { x: 0.0, y: 0.5 }, Coord { x: 0.0, y: 0.6 }, 2)?;
/// assert_eq!(segment.seats, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawRiderSegment"))]
pub struct RiderSegment {
    /// Where the driver collects the rider.
    pub pickup: Coord<f64>,
    /// Where the driver drops the rider off.
    pub dropoff: Coord<f64>,
    /// Seats the rider occupies; always at least one.
    pub seats: u32,
}

/// Unvalidated wire form of [`RiderSegment`]; decoding goes through
/// [`RiderSegment::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawRiderSegment {
    pickup: Coord<f64>,
    dropoff: Coord<f64>,
    #[serde(default = "one_seat")]
    seats: u32,
}

#[cfg(feature = "serde")]
const fn one_seat() -> u32 {
    1
}

#[cfg(feature = "serde")]
impl TryFrom<RawRiderSegment> for RiderSegment {
    type Error = RiderSegmentError;

    fn try_from(raw: RawRiderSegment) -> Result<Self, Self::Error> {
        Self::new(raw.pickup, raw.dropoff, raw.seats)
    }
}

/// Errors returned by [`RiderSegment::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiderSegmentError {
    /// The rider asked for zero seats.
    #[error("a rider must request at least one seat")]
    NoSeats,
}

impl RiderSegment {
    /// Validate and construct a segment.
    pub const fn new(
        pickup: Coord<f64>,
        dropoff: Coord<f64>,
        seats: u32,
    ) -> Result<Self, RiderSegmentError> {
        if seats == 0 {
            return Err(RiderSegmentError::NoSeats);
        }
        Ok(Self {
            pickup,
            dropoff,
            seats,
        })
    }

    /// A single-seat segment, as used for a prospective rider.
    #[must_use]
    pub const fn single(pickup: Coord<f64>, dropoff: Coord<f64>) -> Self {
        Self {
            pickup,
            dropoff,
            seats: 1,
        }
    }
}

/// A rider attached to a trip, either accepted or waiting for approval.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passenger {
    /// Identifier of the rider, unique within a trip.
    pub rider_id: String,
    /// Where the rider travels from and to.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub segment: RiderSegment,
}

impl Passenger {
    /// Construct a passenger from an identifier and a segment.
    pub fn new(rider_id: impl Into<String>, segment: RiderSegment) -> Self {
        Self {
            rider_id: rider_id.into(),
            segment,
        }
    }
}

/// A driver's trip as seen by the matching core.
///
/// The core only reads trips; [`crate::lifecycle`] provides the state
/// transitions that the storage layer applies when riders join or leave.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    /// Identifier used in logs and batch results.
    pub id: String,
    /// Driver's start point.
    pub origin: Coord<f64>,
    /// Driver's end point.
    pub destination: Coord<f64>,
    /// Driver-alone travel time from origin to destination.
    #[cfg_attr(feature = "serde", serde(rename = "base_trip_duration_secs", with = "secs"))]
    pub base_duration: Duration,
    /// Extra minutes the driver accepts on top of [`Trip::base_duration`].
    pub max_detour_minutes: u32,
    /// Seats still free for new riders.
    pub seats_available: u32,
    /// Accepted riders.
    #[cfg_attr(feature = "serde", serde(default))]
    pub passengers: Vec<Passenger>,
    /// Riders waiting for the driver's decision.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requests: Vec<Passenger>,
    /// Fastest known duration serving every accepted passenger.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "current_route_duration_secs", with = "secs", default)
    )]
    pub current_route_duration: Duration,
    /// Road geometry of the driver's route; absent on legacy trips.
    #[cfg_attr(feature = "serde", serde(default))]
    pub route: Option<LineString<f64>>,
}

impl Trip {
    /// Construct a trip with no passengers, requests or route geometry.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use geo::Coord;
    /// use carpool_core::Trip;
    ///
    /// let trip = Trip::new(
    ///     "t1",
    ///     Coord { x: 0.0, y: 0.0 },
    ///     Coord { x: 0.0, y: 1.0 },
    ///     Duration::from_secs(3600),
    ///     10,
    /// );
    /// assert_eq!(trip.detour_budget(), Duration::from_secs(4200));
    /// ```
    pub fn new(
        id: impl Into<String>,
        origin: Coord<f64>,
        destination: Coord<f64>,
        base_duration: Duration,
        max_detour_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            origin,
            destination,
            base_duration,
            max_detour_minutes,
            seats_available: 1,
            passengers: Vec::new(),
            requests: Vec::new(),
            current_route_duration: base_duration,
            route: None,
        }
    }

    /// Set the number of free seats.
    #[must_use]
    pub fn with_seats(mut self, seats_available: u32) -> Self {
        self.seats_available = seats_available;
        self
    }

    /// Attach road geometry for route-aware matching.
    #[must_use]
    pub fn with_route(mut self, route: LineString<f64>) -> Self {
        self.route = Some(route);
        self
    }

    /// Add an accepted passenger without touching the seat count.
    #[must_use]
    pub fn with_passenger(mut self, passenger: Passenger) -> Self {
        self.passengers.push(passenger);
        self
    }

    /// Segments of the accepted passengers, in boarding-list order.
    pub fn segments(&self) -> impl Iterator<Item = &RiderSegment> + '_ {
        self.passengers.iter().map(|passenger| &passenger.segment)
    }

    /// Longest total route duration the driver accepts.
    #[must_use]
    pub fn detour_budget(&self) -> Duration {
        let allowance = Duration::from_secs(u64::from(self.max_detour_minutes) * 60);
        self.base_duration.saturating_add(allowance)
    }

    /// Whether `seats` more seats fit.
    #[must_use]
    pub const fn has_seats_for(&self, seats: u32) -> bool {
        seats > 0 && seats <= self.seats_available
    }

    /// Road geometry usable for route-aware matching, if any.
    #[must_use]
    pub fn usable_route(&self) -> Option<&LineString<f64>> {
        self.route.as_ref().filter(|line| line.0.len() >= 2)
    }
}

/// Serialise [`Duration`] fields as fractional seconds.
#[cfg(feature = "serde")]
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom)
    }
}
