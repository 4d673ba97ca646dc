//! Travel times between coordinates.
//!
//! The [`TravelTimeProvider`] trait abstracts retrieval of pairwise travel
//! times. Callers supply a slice of coordinates and receive an adjacency
//! matrix of [`Duration`](std::time::Duration) values. The narrower
//! [`RouteDurationProvider`] answers a single origin-destination query and is
//! used when a trip is first created.
//!
//! Both traits are synchronous. Implementations backed by a network service
//! block internally so the core stays embeddable in synchronous callers.

mod error;
mod provider;

pub use error::TravelTimeError;
pub use provider::{RouteDurationProvider, TravelTimeMatrix, TravelTimeProvider};
