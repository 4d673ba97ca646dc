//! State transitions of a trip as riders request, join and leave it.
//!
//! Transitions act on an in-memory [`Trip`]; storing the result is the
//! caller's concern. Transitions that change the passenger set recompute the
//! trip's optimal duration and leave the trip untouched when that fails.

use geo::{Coord, LineString};
use log::info;
use thiserror::Error;

use crate::{
    DetourError, DetourEvaluator, Passenger, RouteDurationProvider, TravelTimeError,
    TravelTimeProvider, Trip,
};

/// Errors raised by trip transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// A trip must offer at least one seat.
    #[error("a trip must offer at least one seat")]
    NoSeats,
    /// The rider already has a pending request.
    #[error("rider {rider_id} has already requested this trip")]
    AlreadyRequested {
        /// Rider identifier.
        rider_id: String,
    },
    /// The rider is already a passenger.
    #[error("rider {rider_id} has already joined this trip")]
    AlreadyJoined {
        /// Rider identifier.
        rider_id: String,
    },
    /// Not enough free seats for the request.
    #[error("{requested} seats requested but only {available} available")]
    NotEnoughSeats {
        /// Seats the rider asked for.
        requested: u32,
        /// Seats still free.
        available: u32,
    },
    /// No pending request from the rider.
    #[error("no pending request from rider {rider_id}")]
    RequestNotFound {
        /// Rider identifier.
        rider_id: String,
    },
    /// The rider is not a passenger.
    #[error("rider {rider_id} is not a passenger")]
    PassengerNotFound {
        /// Rider identifier.
        rider_id: String,
    },
    /// Fetching the base duration failed.
    #[error("failed to fetch the base trip duration: {0}")]
    TravelTime(#[from] TravelTimeError),
    /// Recomputing the optimal duration failed.
    #[error("failed to recompute the route duration: {0}")]
    Detour(#[from] DetourError),
}

/// A trip as offered by a driver, before its base duration is known.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripDraft {
    /// Identifier for the new trip.
    pub id: String,
    /// Driver's start point.
    pub origin: Coord<f64>,
    /// Driver's end point.
    pub destination: Coord<f64>,
    /// Seats offered.
    pub seats_available: u32,
    /// Extra minutes the driver accepts.
    pub max_detour_minutes: u32,
    /// Road geometry, when the caller already has it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub route: Option<LineString<f64>>,
}

impl TripDraft {
    /// Validate the draft and fetch its base duration.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NoSeats`] without a lookup when no seat is
    /// offered, or [`LifecycleError::TravelTime`] when the lookup fails.
    pub fn into_trip<P>(self, provider: &P) -> Result<Trip, LifecycleError>
    where
        P: RouteDurationProvider + ?Sized,
    {
        if self.seats_available == 0 {
            return Err(LifecycleError::NoSeats);
        }
        let base_duration = provider.get_route_duration(self.origin, self.destination)?;
        info!("trip {}: base duration {base_duration:?}", self.id);
        let mut trip = Trip::new(
            self.id,
            self.origin,
            self.destination,
            base_duration,
            self.max_detour_minutes,
        )
        .with_seats(self.seats_available);
        trip.route = self.route;
        Ok(trip)
    }
}

impl Trip {
    /// Queue a join request.
    ///
    /// # Errors
    ///
    /// Rejects riders who already requested or joined, and requests for more
    /// seats than are free.
    pub fn request_join(&mut self, passenger: Passenger) -> Result<(), LifecycleError> {
        if self.find_request(&passenger.rider_id).is_some() {
            return Err(LifecycleError::AlreadyRequested {
                rider_id: passenger.rider_id,
            });
        }
        if self.find_passenger(&passenger.rider_id).is_some() {
            return Err(LifecycleError::AlreadyJoined {
                rider_id: passenger.rider_id,
            });
        }
        self.ensure_seats(passenger.segment.seats)?;
        self.requests.push(passenger);
        Ok(())
    }

    /// Drop a pending request and return it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::RequestNotFound`] when the rider has no
    /// pending request.
    pub fn reject_request(&mut self, rider_id: &str) -> Result<Passenger, LifecycleError> {
        let idx = self
            .find_request(rider_id)
            .ok_or_else(|| LifecycleError::RequestNotFound {
                rider_id: rider_id.to_owned(),
            })?;
        Ok(self.requests.remove(idx))
    }

    /// Move a pending request into the passenger list, take its seats and
    /// recompute the optimal duration.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::RequestNotFound`],
    /// [`LifecycleError::NotEnoughSeats`] or [`LifecycleError::Detour`]. The
    /// trip is unchanged on error.
    pub fn accept_request<T: TravelTimeProvider>(
        &mut self,
        rider_id: &str,
        evaluator: &DetourEvaluator<T>,
    ) -> Result<(), LifecycleError> {
        let idx = self
            .find_request(rider_id)
            .ok_or_else(|| LifecycleError::RequestNotFound {
                rider_id: rider_id.to_owned(),
            })?;
        let seats = self.requests[idx].segment.seats;
        self.ensure_seats(seats)?;

        let mut next = self.clone();
        let passenger = next.requests.remove(idx);
        next.passengers.push(passenger);
        next.seats_available -= seats;
        next.current_route_duration = evaluator.recompute_optimal_duration(&next)?;

        info!(
            "trip {}: accepted {rider_id}, route now {:?}",
            self.id, next.current_route_duration
        );
        *self = next;
        Ok(())
    }

    /// Remove a passenger, return their seats and recompute the optimal
    /// duration.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::PassengerNotFound`] or
    /// [`LifecycleError::Detour`]. The trip is unchanged on error.
    pub fn leave_trip<T: TravelTimeProvider>(
        &mut self,
        rider_id: &str,
        evaluator: &DetourEvaluator<T>,
    ) -> Result<Passenger, LifecycleError> {
        let idx = self
            .find_passenger(rider_id)
            .ok_or_else(|| LifecycleError::PassengerNotFound {
                rider_id: rider_id.to_owned(),
            })?;

        let mut next = self.clone();
        let passenger = next.passengers.remove(idx);
        next.seats_available = next.seats_available.saturating_add(passenger.segment.seats);
        next.current_route_duration = evaluator.recompute_optimal_duration(&next)?;

        info!(
            "trip {}: {rider_id} left, route now {:?}",
            self.id, next.current_route_duration
        );
        *self = next;
        Ok(passenger)
    }

    fn find_request(&self, rider_id: &str) -> Option<usize> {
        self.requests.iter().position(|r| r.rider_id == rider_id)
    }

    fn find_passenger(&self, rider_id: &str) -> Option<usize> {
        self.passengers.iter().position(|p| p.rider_id == rider_id)
    }

    fn ensure_seats(&self, requested: u32) -> Result<(), LifecycleError> {
        if self.has_seats_for(requested) {
            Ok(())
        } else {
            Err(LifecycleError::NotEnoughSeats {
                requested,
                available: self.seats_available,
            })
        }
    }
}
