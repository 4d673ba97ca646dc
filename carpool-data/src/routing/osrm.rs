//! OSRM API response types for the Table and Route services.
//!
//! Only the fields the providers read are modelled; everything else in the
//! response is ignored.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service> and
//! <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// Status code OSRM reports on success.
const OK: &str = "Ok";

/// Status code OSRM reports when the points cannot be connected.
pub const NO_ROUTE: &str = "NoRoute";

/// OSRM Table API response.
///
/// The response contains either a duration matrix on success or an error
/// message on failure. The `code` field indicates the response status.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM, `"Ok"` on success.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Matrix of durations in seconds.
    ///
    /// `durations[i][j]` is the travel time from the i-th to the j-th
    /// coordinate. Values are `None` when no route exists between a pair.
    pub durations: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == OK
    }
}

/// OSRM Route API response, requested with `overview=false`.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM, `"Ok"` on success.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, fastest first.
    #[serde(default)]
    pub routes: Vec<RouteSummary>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == OK
    }
}

/// One route of a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct RouteSummary {
    /// Travel time in seconds.
    pub duration: f64,
}
