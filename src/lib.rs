pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

pub use errors::{AuthError, GatewayError, UpstreamError, ValidationError};
pub use models::{AppState, FlightQuery, NormalizedQuote, RawFlightOffer};
