//! Match command implementation for the carpool CLI.
//!
//! Matching is purely geometric, so this command never contacts a routing
//! server.

use std::io::Write;

use camino::Utf8PathBuf;
use carpool_core::matcher::{DEFAULT_THRESHOLD_KM, evaluate_route_match};
use carpool_core::{RouteMatch, Trip};
use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::coords::parse_coord;
use crate::output::write_json;
use crate::search::load_trips;
use crate::{
    ARG_DESTINATION, ARG_ORIGIN, ARG_THRESHOLD_KM, ARG_TRIPS, CliError, ENV_MATCH_DESTINATION,
    ENV_MATCH_ORIGIN, ENV_MATCH_TRIPS,
};

/// CLI arguments for the `match` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "match",
    long_about = "Browse trips whose route passes near the rider's pickup and \
                 dropoff in the right order. Trips without route geometry \
                 fall back to endpoint proximity checks.",
    about = "List trips whose route suits a rider"
)]
#[ortho_config(prefix = "CARPOOL")]
pub(crate) struct MatchArgs {
    /// Path to a JSON file containing an array of trips.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) trips: Option<Utf8PathBuf>,
    /// Rider pickup point as `LON,LAT`.
    #[arg(long = ARG_ORIGIN, value_name = "lon,lat", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) origin: Option<String>,
    /// Rider dropoff point as `LON,LAT`.
    #[arg(long = ARG_DESTINATION, value_name = "lon,lat", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) destination: Option<String>,
    /// Maximum distance in kilometres between a rider point and the route.
    #[arg(long = ARG_THRESHOLD_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) threshold_km: Option<f64>,
}

impl MatchArgs {
    pub(crate) fn into_config(self) -> Result<MatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatchConfig::try_from(merged)
    }
}

/// Resolved `match` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatchConfig {
    pub(crate) trips: Utf8PathBuf,
    pub(crate) origin: Coord<f64>,
    pub(crate) destination: Coord<f64>,
    pub(crate) threshold_km: f64,
}

impl TryFrom<MatchArgs> for MatchConfig {
    type Error = CliError;

    fn try_from(args: MatchArgs) -> Result<Self, Self::Error> {
        let trips = args.trips.ok_or(CliError::MissingArgument {
            field: ARG_TRIPS,
            env: ENV_MATCH_TRIPS,
        })?;
        let origin = args.origin.ok_or(CliError::MissingArgument {
            field: ARG_ORIGIN,
            env: ENV_MATCH_ORIGIN,
        })?;
        let destination = args.destination.ok_or(CliError::MissingArgument {
            field: ARG_DESTINATION,
            env: ENV_MATCH_DESTINATION,
        })?;
        let threshold_km = args.threshold_km.unwrap_or(DEFAULT_THRESHOLD_KM);
        if !threshold_km.is_finite() || threshold_km <= 0.0 {
            return Err(CliError::InvalidThreshold {
                field: ARG_THRESHOLD_KM,
                value: threshold_km,
            });
        }

        Ok(Self {
            trips,
            origin: parse_coord(ARG_ORIGIN, &origin)?,
            destination: parse_coord(ARG_DESTINATION, &destination)?,
            threshold_km,
        })
    }
}

/// JSON document printed by `carpool match`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct MatchReport {
    /// Identifiers of matching trips, in input order.
    pub(crate) matched: Vec<String>,
    /// Verdict for every trip, in input order.
    pub(crate) verdicts: Vec<TripVerdict>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct TripVerdict {
    pub(crate) trip_id: String,
    pub(crate) verdict: RouteMatch,
}

impl MatchReport {
    fn evaluate(config: &MatchConfig, trips: &[Trip]) -> Self {
        let verdicts: Vec<TripVerdict> = trips
            .iter()
            .map(|trip| TripVerdict {
                trip_id: trip.id.clone(),
                verdict: evaluate_route_match(
                    config.origin,
                    config.destination,
                    trip,
                    config.threshold_km,
                ),
            })
            .collect();
        let matched = verdicts
            .iter()
            .filter(|entry| entry.verdict.is_match())
            .map(|entry| entry.trip_id.clone())
            .collect();
        Self { matched, verdicts }
    }
}

pub(super) fn run_match(args: MatchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_match_with(args, &mut stdout)
}

pub(super) fn run_match_with(args: MatchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let trips = load_trips(&config.trips)?;
    let report = MatchReport::evaluate(&config, &trips);
    log::info!(
        "{} of {} trips match the rider",
        report.matched.len(),
        trips.len()
    );
    write_json(writer, &report)
}
