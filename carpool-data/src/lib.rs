//! Network-backed data access for the carpool engine.
//!
//! Responsibilities:
//! - Implement the travel-time capabilities of `carpool-core` against an
//!   OSRM-compatible routing service.
//! - Encapsulate the service's wire format.
//!
//! Boundaries:
//! - Do not encode matching or detour rules (those live in `carpool-core`).
//! - Keep blocking I/O off async executors.
//!
//! Invariants:
//! - No global mutable state.

pub mod routing;
