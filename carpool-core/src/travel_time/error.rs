use thiserror::Error;

/// Errors from [`crate::TravelTimeProvider`] and
/// [`crate::RouteDurationProvider`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelTimeError {
    /// No coordinates were provided.
    ///
    /// A matrix needs at least one point. The evaluator never sends an empty
    /// slice because a trip always contributes its origin and destination.
    #[error("at least one coordinate is required")]
    EmptyInput,
    /// The routing service did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in whole seconds.
        timeout_secs: u64,
    },
    /// The routing service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Status text or body excerpt.
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// Requested URL.
        url: String,
        /// Underlying transport error.
        message: String,
    },
    /// The routing service reported an error in its response body.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Service-specific error code.
        code: String,
        /// Human-readable detail.
        message: String,
    },
    /// The response could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error text.
        message: String,
    },
    /// The service found no route between the requested points.
    #[error("no route found between the requested points")]
    NoRoute,
}
