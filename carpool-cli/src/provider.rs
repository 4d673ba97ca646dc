//! Construction of the travel-time provider used by the network-backed
//! commands.

use carpool_core::TravelTimeProvider;
use carpool_data::routing::HttpTravelTimeProvider;
use log::debug;

use crate::CliError;

/// Builds a travel-time provider for the current invocation.
pub(crate) trait ProviderBuilder {
    fn build(&self, base_url: &str) -> Result<Box<dyn TravelTimeProvider>, CliError>;
}

/// Talks to an OSRM-compatible server over HTTP.
pub(crate) struct HttpProviderBuilder;

impl ProviderBuilder for HttpProviderBuilder {
    fn build(&self, base_url: &str) -> Result<Box<dyn TravelTimeProvider>, CliError> {
        debug!("using OSRM server at {base_url}");
        let provider = HttpTravelTimeProvider::new(base_url).map_err(|source| {
            CliError::BuildTravelTimeProvider {
                base_url: base_url.to_owned(),
                source,
            }
        })?;
        Ok(Box::new(provider))
    }
}
