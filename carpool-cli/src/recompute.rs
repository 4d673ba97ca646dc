//! Recompute command implementation for the carpool CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use carpool_core::{DetourEvaluator, Stop, Trip};
use carpool_data::routing::HttpTravelTimeProviderConfig;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::input::{load_json, require_existing};
use crate::output::write_json;
use crate::provider::{HttpProviderBuilder, ProviderBuilder};
use crate::{ARG_OSRM_BASE_URL, ARG_TRIP, CliError, ENV_RECOMPUTE_TRIP};

/// CLI arguments for the `recompute` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "recompute",
    long_about = "Plan the fastest pickup and dropoff order for a trip's \
                 accepted passengers and report its duration. Trips without \
                 passengers report their base duration without contacting \
                 the routing server.",
    about = "Recompute a trip's optimal route duration"
)]
#[ortho_config(prefix = "CARPOOL")]
pub(crate) struct RecomputeArgs {
    /// Path to a JSON file containing a single trip.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) trip: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
}

impl RecomputeArgs {
    pub(crate) fn into_config(self) -> Result<RecomputeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecomputeConfig::try_from(merged)
    }
}

/// Resolved `recompute` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecomputeConfig {
    pub(crate) trip: Utf8PathBuf,
    pub(crate) osrm_base_url: String,
}

impl TryFrom<RecomputeArgs> for RecomputeConfig {
    type Error = CliError;

    fn try_from(args: RecomputeArgs) -> Result<Self, Self::Error> {
        let trip = args.trip.ok_or(CliError::MissingArgument {
            field: ARG_TRIP,
            env: ENV_RECOMPUTE_TRIP,
        })?;
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| HttpTravelTimeProviderConfig::default().base_url);
        Ok(Self {
            trip,
            osrm_base_url,
        })
    }
}

/// JSON document printed by `carpool recompute`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct RecomputeReport {
    pub(crate) trip_id: String,
    /// Optimal duration serving every accepted passenger.
    pub(crate) duration_secs: f64,
    pub(crate) base_duration_secs: f64,
    /// Stops in travel order.
    pub(crate) stops: Vec<StopReport>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct StopReport {
    pub(crate) kind: StopKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) rider_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum StopKind {
    Origin,
    Pickup,
    Dropoff,
    Destination,
}

impl StopReport {
    fn describe(trip: &Trip, stop: Stop) -> Self {
        let rider = |index: usize| trip.passengers.get(index).map(|p| p.rider_id.clone());
        match stop {
            Stop::Origin => Self {
                kind: StopKind::Origin,
                rider_id: None,
            },
            Stop::Destination => Self {
                kind: StopKind::Destination,
                rider_id: None,
            },
            Stop::Pickup(index) => Self {
                kind: StopKind::Pickup,
                rider_id: rider(index),
            },
            Stop::Dropoff(index) => Self {
                kind: StopKind::Dropoff,
                rider_id: rider(index),
            },
        }
    }
}

pub(super) fn run_recompute(args: RecomputeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_recompute_with(args, &HttpProviderBuilder, &mut stdout)
}

pub(super) fn run_recompute_with(
    args: RecomputeArgs,
    builder: &dyn ProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.trip, ARG_TRIP)?;
    let trip: Trip = load_json(&config.trip)?;
    let report = plan(&trip, &config, builder)?;
    write_json(writer, &report)
}

fn plan(
    trip: &Trip,
    config: &RecomputeConfig,
    builder: &dyn ProviderBuilder,
) -> Result<RecomputeReport, CliError> {
    let evaluator = DetourEvaluator::new(builder.build(&config.osrm_base_url)?);
    let route = evaluator
        .recompute_route(trip)
        .map_err(|source| CliError::Recompute {
            trip_id: trip.id.clone(),
            source,
        })?;
    Ok(RecomputeReport {
        trip_id: trip.id.clone(),
        duration_secs: route.total.as_secs_f64(),
        base_duration_secs: trip.base_duration.as_secs_f64(),
        stops: route
            .stop_kinds()
            .map(|stop| StopReport::describe(trip, stop))
            .collect(),
    })
}
