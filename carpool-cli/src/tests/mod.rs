//! Shared test harness modules for the carpool CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod helpers;
mod match_unit;
mod recompute_unit;
