//! HTTP travel-time provider using OSRM's Table and Route APIs.
//!
//! [`HttpTravelTimeProvider`] implements both [`TravelTimeProvider`] and
//! [`RouteDurationProvider`] by issuing HTTP requests to an OSRM-compatible
//! routing service.
//!
//! # Architecture
//!
//! The capability traits are synchronous to keep the core library embeddable
//! in synchronous contexts. This provider bridges the async HTTP calls to the
//! sync interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use carpool_data::routing::HttpTravelTimeProvider;
//! use carpool_core::{RouteDurationProvider, TravelTimeProvider};
//! use geo::Coord;
//!
//! let provider = HttpTravelTimeProvider::new("http://localhost:5000")?;
//! let origin = Coord { x: -0.1, y: 51.5 };
//! let destination = Coord { x: -0.2, y: 51.6 };
//!
//! let base = provider.get_route_duration(origin, destination)?;
//! let matrix = provider.get_travel_time_matrix(&[origin, destination])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::future::Future;
use std::time::Duration;

use carpool_core::{RouteDurationProvider, TravelTimeError, TravelTimeMatrix, TravelTimeProvider};
use geo::Coord;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::osrm::{NO_ROUTE, RouteResponse, TableResponse};

/// Error type for [`HttpTravelTimeProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "carpool-routing/0.1";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "driving";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpTravelTimeProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTravelTimeProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the URL, such as `driving`.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpTravelTimeProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpTravelTimeProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP-based travel time provider for OSRM-compatible services.
///
/// The provider owns a Tokio runtime that is reused across calls, avoiding
/// the overhead of creating a new runtime per request.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the provider
/// falls back to its own internal runtime. This avoids the panic that
/// `block_in_place` would cause, but may deadlock if the caller's runtime is
/// driving IO or timers that this request depends on.
pub struct HttpTravelTimeProvider {
    client: Client,
    config: HttpTravelTimeProviderConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpTravelTimeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTravelTimeProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpTravelTimeProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpTravelTimeProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpTravelTimeProviderConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The configuration the provider was built with.
    #[must_use]
    pub const fn config(&self) -> &HttpTravelTimeProviderConfig {
        &self.config
    }

    /// Build `{base_url}/{service}/v1/{profile}/{lon,lat;...}`.
    fn build_url(&self, service: &str, coords: &[Coord<f64>]) -> String {
        let coords: String = coords
            .iter()
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/{service}/v1/{}/{coords}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
        )
    }

    fn build_table_url(&self, coords: &[Coord<f64>]) -> String {
        self.build_url("table", coords)
    }

    fn build_route_url(&self, origin: Coord<f64>, destination: Coord<f64>) -> String {
        format!(
            "{}?overview=false",
            self.build_url("route", &[origin, destination])
        )
    }

    /// GET `url` and decode its JSON body.
    ///
    /// OSRM reports failures such as `NoRoute` or `InvalidQuery` with a 4xx
    /// status and a `{code, message}` body. Such bodies are decoded so the
    /// caller can map the code; anything else becomes an HTTP error.
    async fn fetch_json<R: DeserializeOwned>(&self, url: &str) -> Result<R, TravelTimeError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|err| TravelTimeError::ParseError {
                    message: err.to_string(),
                });
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        if status.is_client_error()
            && let Ok(decoded) = serde_json::from_str(&body)
        {
            debug!("{url} answered {status} with an OSRM status body");
            return Ok(decoded);
        }
        Err(TravelTimeError::HttpError {
            url: url.to_owned(),
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        })
    }

    /// Run `future` to completion from synchronous code.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        // block_in_place requires a multi-threaded runtime; for current_thread
        // runtimes we fall back to our own stored runtime.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    /// Convert a reqwest error to a `TravelTimeError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TravelTimeError {
        if error.is_timeout() {
            return TravelTimeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TravelTimeError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TravelTimeError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Convert an OSRM Table response to a `TravelTimeMatrix`.
///
/// Null cells become `Duration::MAX` to mark unreachable pairs. Negative,
/// NaN and infinite values are treated the same way.
fn convert_table(response: TableResponse) -> Result<TravelTimeMatrix, TravelTimeError> {
    if !response.is_ok() {
        return Err(TravelTimeError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let durations = response
        .durations
        .ok_or_else(|| TravelTimeError::ParseError {
            message: "OSRM response missing durations array".to_string(),
        })?;

    Ok(durations
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| {
                    cell.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                        .unwrap_or(Duration::MAX)
                })
                .collect()
        })
        .collect())
}

/// Convert an OSRM Route response to the fastest route's duration.
fn convert_route(response: RouteResponse) -> Result<Duration, TravelTimeError> {
    if response.code == NO_ROUTE {
        return Err(TravelTimeError::NoRoute);
    }
    if !response.is_ok() {
        return Err(TravelTimeError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let route = response.routes.first().ok_or(TravelTimeError::NoRoute)?;
    Duration::try_from_secs_f64(route.duration).map_err(|err| TravelTimeError::ParseError {
        message: format!("invalid route duration {}: {err}", route.duration),
    })
}

impl TravelTimeProvider for HttpTravelTimeProvider {
    /// Fetch the travel time matrix for the given coordinates.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded. See the type-level documentation.
    fn get_travel_time_matrix(
        &self,
        coords: &[Coord<f64>],
    ) -> Result<TravelTimeMatrix, TravelTimeError> {
        if coords.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }

        let url = self.build_table_url(coords);
        let response: TableResponse = self.block_on(self.fetch_json(&url))?;
        convert_table(response)
    }
}

impl RouteDurationProvider for HttpTravelTimeProvider {
    fn get_route_duration(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<Duration, TravelTimeError> {
        let url = self.build_route_url(origin, destination);
        let response: RouteResponse = self.block_on(self.fetch_json(&url))?;
        convert_route(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    use crate::routing::osrm::RouteSummary;

    #[fixture]
    fn sample_coords() -> Vec<Coord<f64>> {
        vec![Coord { x: -0.1, y: 51.5 }, Coord { x: -0.2, y: 51.6 }]
    }

    #[fixture]
    fn provider() -> HttpTravelTimeProvider {
        HttpTravelTimeProvider::new("http://osrm.example.com").expect("provider should build")
    }

    fn table(code: &str, durations: Option<Vec<Vec<Option<f64>>>>) -> TableResponse {
        TableResponse {
            code: code.to_string(),
            message: None,
            durations,
        }
    }

    #[rstest]
    fn table_url_formats_coordinates(
        provider: HttpTravelTimeProvider,
        sample_coords: Vec<Coord<f64>>,
    ) {
        assert_eq!(
            provider.build_table_url(&sample_coords),
            "http://osrm.example.com/table/v1/driving/-0.1,51.5;-0.2,51.6"
        );
    }

    #[rstest]
    fn route_url_requests_no_overview(provider: HttpTravelTimeProvider) {
        let url = provider.build_route_url(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
        assert_eq!(
            url,
            "http://osrm.example.com/route/v1/driving/0,0;0,1?overview=false"
        );
    }

    #[rstest]
    fn urls_respect_profile_and_trailing_slash(sample_coords: Vec<Coord<f64>>) {
        let config =
            HttpTravelTimeProviderConfig::new("http://osrm.example.com/").with_profile("car");
        let provider = HttpTravelTimeProvider::with_config(config).expect("provider should build");

        let url = provider.build_table_url(&sample_coords);

        assert!(url.starts_with("http://osrm.example.com/table/v1/car/"));
        assert!(!url.contains("//table"));
    }

    #[rstest]
    fn table_success_converts_seconds() {
        let matrix = convert_table(table(
            "Ok",
            Some(vec![vec![Some(0.0), Some(120.5)], vec![Some(120.5), Some(0.0)]]),
        ))
        .expect("should parse");

        assert_eq!(matrix[0][0], Duration::ZERO);
        assert_eq!(matrix[0][1], Duration::from_secs_f64(120.5));
        assert_eq!(matrix[1][1], Duration::ZERO);
    }

    #[rstest]
    fn table_invalid_cells_become_unreachable() {
        let matrix = convert_table(table(
            "Ok",
            Some(vec![
                vec![Some(0.0), None, Some(-1.0)],
                vec![Some(f64::NAN), Some(0.0), Some(f64::INFINITY)],
                vec![Some(100.0), Some(200.0), Some(0.0)],
            ]),
        ))
        .expect("should parse");

        assert_eq!(matrix[0][1], Duration::MAX);
        assert_eq!(matrix[0][2], Duration::MAX);
        assert_eq!(matrix[1][0], Duration::MAX);
        assert_eq!(matrix[1][2], Duration::MAX);
        assert_eq!(matrix[2][1], Duration::from_secs(200));
    }

    #[rstest]
    fn table_service_error_keeps_code_and_message() {
        let response = TableResponse {
            code: "InvalidQuery".to_string(),
            message: Some("Too many coordinates".to_string()),
            durations: None,
        };

        let err = convert_table(response).expect_err("should fail");

        assert_eq!(
            err,
            TravelTimeError::ServiceError {
                code: "InvalidQuery".to_string(),
                message: "Too many coordinates".to_string(),
            }
        );
    }

    #[rstest]
    fn table_missing_durations_is_a_parse_error() {
        let err = convert_table(table("Ok", None)).expect_err("should fail");
        assert!(matches!(err, TravelTimeError::ParseError { .. }));
    }

    #[rstest]
    fn route_takes_the_first_route() {
        let response = RouteResponse {
            code: "Ok".to_string(),
            message: None,
            routes: vec![RouteSummary { duration: 1800.0 }, RouteSummary { duration: 2000.0 }],
        };
        assert_eq!(convert_route(response), Ok(Duration::from_secs(1800)));
    }

    #[rstest]
    #[case::no_route_code("NoRoute", vec![])]
    #[case::no_routes("Ok", vec![])]
    fn route_without_routes_is_no_route(#[case] code: &str, #[case] routes: Vec<RouteSummary>) {
        let response = RouteResponse {
            code: code.to_string(),
            message: None,
            routes,
        };
        assert_eq!(convert_route(response), Err(TravelTimeError::NoRoute));
    }

    #[rstest]
    fn route_negative_duration_is_a_parse_error() {
        let response = RouteResponse {
            code: "Ok".to_string(),
            message: None,
            routes: vec![RouteSummary { duration: -5.0 }],
        };
        assert!(matches!(
            convert_route(response),
            Err(TravelTimeError::ParseError { .. })
        ));
    }

    #[rstest]
    fn empty_input_returns_error(provider: HttpTravelTimeProvider) {
        let err = provider
            .get_travel_time_matrix(&[])
            .expect_err("should fail");

        assert_eq!(err, TravelTimeError::EmptyInput);
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpTravelTimeProviderConfig::new("http://example.com")
            .with_profile("foot")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.profile, "foot");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }
}
