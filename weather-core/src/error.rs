use thiserror::Error;

/// Everything that can go wrong while fetching a forecast.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connect or TLS failure, or the body could not be read.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Any non-200 status. Status and body are logged, not surfaced.
    #[error("Weather API not available")]
    ServiceUnavailable,

    /// Body was not valid forecast JSON.
    #[error("failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("weather response contained no forecast days")]
    MissingForecast,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout(err) } else { FetchError::Network(err) }
    }
}
