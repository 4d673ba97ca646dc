//! Search command implementation for the carpool CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use carpool_core::{DetourEvaluator, SearchOutcome, SearchStats, Trip, search_trips};
use carpool_data::routing::HttpTravelTimeProviderConfig;
use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::coords::parse_coord;
use crate::input::{load_json, require_existing};
use crate::output::write_json;
use crate::provider::{HttpProviderBuilder, ProviderBuilder};
use crate::{
    ARG_DESTINATION, ARG_ORIGIN, ARG_OSRM_BASE_URL, ARG_TRIPS, CliError, ENV_SEARCH_DESTINATION,
    ENV_SEARCH_ORIGIN, ENV_SEARCH_TRIPS,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "search",
    long_about = "Find the trips a rider could join. Trips are read from a \
                 JSON array; candidates outside the rider's bounding box or \
                 without a free seat are skipped before an OSRM instance is \
                 asked for travel times.",
    about = "Search trips a rider can join within the driver's detour budget"
)]
#[ortho_config(prefix = "CARPOOL")]
pub(crate) struct SearchArgs {
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
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchConfig {
    pub(crate) trips: Utf8PathBuf,
    pub(crate) origin: Coord<f64>,
    pub(crate) destination: Coord<f64>,
    pub(crate) osrm_base_url: String,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let trips = args.trips.ok_or(CliError::MissingArgument {
            field: ARG_TRIPS,
            env: ENV_SEARCH_TRIPS,
        })?;
        let origin = args.origin.ok_or(CliError::MissingArgument {
            field: ARG_ORIGIN,
            env: ENV_SEARCH_ORIGIN,
        })?;
        let destination = args.destination.ok_or(CliError::MissingArgument {
            field: ARG_DESTINATION,
            env: ENV_SEARCH_DESTINATION,
        })?;
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| HttpTravelTimeProviderConfig::default().base_url);

        Ok(Self {
            trips,
            origin: parse_coord(ARG_ORIGIN, &origin)?,
            destination: parse_coord(ARG_DESTINATION, &destination)?,
            osrm_base_url,
        })
    }
}

/// JSON document printed by `carpool search`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct SearchReport {
    /// Identifiers of trips the rider can join, in input order.
    pub(crate) feasible: Vec<String>,
    /// Trips skipped because their travel times could not be obtained.
    pub(crate) failures: Vec<FailureReport>,
    /// Candidate counts after each stage.
    pub(crate) stats: SearchStats,
}

/// One skipped trip.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct FailureReport {
    pub(crate) trip_id: String,
    pub(crate) error: String,
}

impl From<SearchOutcome<'_>> for SearchReport {
    fn from(outcome: SearchOutcome<'_>) -> Self {
        Self {
            feasible: outcome.feasible.iter().map(|trip| trip.id.clone()).collect(),
            failures: outcome
                .failures
                .into_iter()
                .map(|failure| FailureReport {
                    trip_id: failure.trip_id,
                    error: failure.error.to_string(),
                })
                .collect(),
            stats: outcome.stats,
        }
    }
}

pub(super) fn run_search(args: SearchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_search_with(args, &HttpProviderBuilder, &mut stdout)
}

pub(super) fn run_search_with(
    args: SearchArgs,
    builder: &dyn ProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let trips = load_trips(&config.trips)?;
    let evaluator = DetourEvaluator::new(builder.build(&config.osrm_base_url)?);
    let outcome = search_trips(&evaluator, config.origin, config.destination, &trips);
    write_json(writer, &SearchReport::from(outcome))
}

/// Load the trip list a search or match runs over.
pub(crate) fn load_trips(path: &Utf8Path) -> Result<Vec<Trip>, CliError> {
    require_existing(path, ARG_TRIPS)?;
    load_json(path)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
