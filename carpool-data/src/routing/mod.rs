//! HTTP-based travel time providers for routing services.
//!
//! This module provides [`HttpTravelTimeProvider`], an implementation of
//! [`carpool_core::TravelTimeProvider`] and
//! [`carpool_core::RouteDurationProvider`] backed by an OSRM routing service.
//!
//! # Architecture
//!
//! Matrices come from the OSRM Table API and single origin-destination
//! durations from the Route API. The synchronous capability traits are
//! implemented by blocking on async HTTP calls internally, keeping the core
//! library embeddable in synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use carpool_data::routing::{HttpTravelTimeProvider, HttpTravelTimeProviderConfig};
//! use carpool_core::TravelTimeProvider;
//! use geo::Coord;
//! use std::time::Duration;
//!
//! let config = HttpTravelTimeProviderConfig::new("http://localhost:5000")
//!     .with_profile("driving")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_user_agent("my-app/1.0");
//! let provider = HttpTravelTimeProvider::with_config(config)?;
//!
//! let coords = [Coord { x: -0.1, y: 51.5 }, Coord { x: -0.2, y: 51.6 }];
//! let matrix = provider.get_travel_time_matrix(&coords)?;
//! println!("Travel time: {:?}", matrix[0][1]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_PROFILE, DEFAULT_USER_AGENT, HttpTravelTimeProvider, HttpTravelTimeProviderConfig,
    ProviderBuildError,
};
