//! Logging backend for the `log` facade used throughout the workspace.

use log::LevelFilter;

/// Map the number of `--verbose` flags to a level filter.
pub(crate) const fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub(crate) fn initialize_logging(verbosity: u8) {
    let initialised = env_logger::builder()
        .filter_level(level_for(verbosity))
        .parse_default_env() // RUST_LOG overrides the flag-derived level
        .try_init();
    if initialised.is_err() {
        log::debug!("logger already initialised");
    }
}
