//! Command-line interface for the carpool matching engine.
#![forbid(unsafe_code)]

use clap::{ArgAction, Parser, Subcommand};

mod coords;
mod error;
mod input;
mod logging;
mod matching;
mod output;
mod provider;
mod recompute;
mod search;

pub use error::CliError;

use matching::{MatchArgs, run_match};
use recompute::{RecomputeArgs, run_recompute};
use search::{SearchArgs, run_search};

const ARG_TRIPS: &str = "trips";
const ARG_TRIP: &str = "trip";
const ARG_ORIGIN: &str = "origin";
const ARG_DESTINATION: &str = "destination";
const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_THRESHOLD_KM: &str = "threshold-km";
const ENV_SEARCH_TRIPS: &str = "CARPOOL_CMDS_SEARCH_TRIPS";
const ENV_SEARCH_ORIGIN: &str = "CARPOOL_CMDS_SEARCH_ORIGIN";
const ENV_SEARCH_DESTINATION: &str = "CARPOOL_CMDS_SEARCH_DESTINATION";
const ENV_MATCH_TRIPS: &str = "CARPOOL_CMDS_MATCH_TRIPS";
const ENV_MATCH_ORIGIN: &str = "CARPOOL_CMDS_MATCH_ORIGIN";
const ENV_MATCH_DESTINATION: &str = "CARPOOL_CMDS_MATCH_DESTINATION";
const ENV_RECOMPUTE_TRIP: &str = "CARPOOL_CMDS_RECOMPUTE_TRIP";

/// Run the carpool CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    logging::initialize_logging(cli.verbose);
    match cli.command {
        Command::Search(args) => run_search(args),
        Command::Match(args) => run_match(args),
        Command::Recompute(args) => run_recompute(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "carpool",
    about = "Match riders to carpool trips and check detour feasibility",
    version
)]
struct Cli {
    /// Increase log output; repeat for more detail. `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find trips a rider can join within each driver's detour budget.
    Search(SearchArgs),
    /// List trips whose route geometry suits a rider.
    Match(MatchArgs),
    /// Plan the fastest stop order for a trip's accepted passengers.
    Recompute(RecomputeArgs),
}

#[cfg(test)]
mod tests;
