use thiserror::Error;

/// Caller mistakes. Never retried, always answered with a 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameters: origin, destination, or date.")]
    MissingParameters,

    #[error("Origin and destination IATA codes must be in all caps.")]
    NotUppercase,

    #[error("Date must be in the format YYYY-MM-DD.")]
    DateFormat,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("token response did not contain an access token")]
    MissingToken,
}

/// Failures talking to the flight offers API. The display strings are what
/// callers see in the error body.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Could not fetch access token.")]
    NoToken(#[source] AuthError),

    #[error("Failed to fetch flight offers due to an error.")]
    RequestFailed(String),

    #[error("No flight data found in API response.")]
    NoData,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Unexpected response format from API.")]
    UnexpectedFormat,
}

impl warp::reject::Reject for GatewayError {}
