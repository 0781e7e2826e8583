use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{AmadeusSettings, MAX_OFFERS, REQUEST_TIMEOUT_SECS, TOKEN_TTL_SECS};
use crate::errors::{AuthError, UpstreamError};
use crate::models::{AccessToken, FlightQuery, OffersPage};
use crate::services::TtlCache;

/// Source of raw flight offers. The handler only talks to this seam.
#[async_trait]
pub trait OfferSource: Send + Sync {
    async fn fetch_offers(&self, query: &FlightQuery) -> Result<OffersPage, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client for the Amadeus self-service API: client-credentials token
/// exchange plus the flight offers search. Single attempt per call.
pub struct AmadeusClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    offers_url: String,
    tokens: TtlCache<AccessToken>,
}

impl AmadeusClient {
    pub fn new(settings: &AmadeusSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            token_url: settings.token_url(),
            offers_url: settings.offers_url(),
            tokens: TtlCache::new(Duration::from_secs(TOKEN_TTL_SECS)),
        })
    }

    /// Replaces the token cache with one holding tokens for `ttl`.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.tokens = TtlCache::new(ttl);
        self
    }

    pub fn token_ttl(&self) -> Option<Duration> {
        self.tokens.time_to_live()
    }

    /// Cached access token, or a freshly requested one.
    pub async fn access_token(&self) -> Result<AccessToken, AuthError> {
        // The token endpoint URL doubles as the cache key.
        if let Some(token) = self.tokens.get(&self.token_url).await {
            tracing::debug!("Using cached access token");
            return Ok(token);
        }

        let token = self.request_token().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to retrieve access token");
            e
        })?;

        self.tokens.set(&self.token_url, token.clone()).await;
        Ok(token)
    }

    /// Drops the cached token so the next call goes back to the token endpoint.
    pub async fn invalidate_token(&self) -> bool {
        self.tokens.expire(&self.token_url).await
    }

    async fn request_token(&self) -> Result<AccessToken, AuthError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self.client.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Status(status));
        }

        let body = response.json::<TokenResponse>().await?;
        let value = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        tracing::debug!("Obtained new access token");

        Ok(AccessToken { value })
    }
}

#[async_trait]
impl OfferSource for AmadeusClient {
    async fn fetch_offers(&self, query: &FlightQuery) -> Result<OffersPage, UpstreamError> {
        let token = self.access_token().await.map_err(UpstreamError::NoToken)?;

        let params = [
            ("originLocationCode", query.origin.clone()),
            ("destinationLocationCode", query.destination.clone()),
            ("departureDate", query.departure_date.clone()),
            ("adults", query.adults.to_string()),
            ("max", MAX_OFFERS.to_string()),
        ];

        let response = self
            .client
            .get(&self.offers_url)
            .bearer_auth(&token.value)
            .query(&params)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(request_failed)?;

        let body = response.json::<Value>().await.map_err(request_failed)?;

        parse_offers(body)
    }
}

fn request_failed(err: reqwest::Error) -> UpstreamError {
    tracing::warn!(error = %err, "Failed to fetch flight offers");
    UpstreamError::RequestFailed(err.to_string())
}

/// Splits an offers response body into its `data` member and location
/// dictionary. A missing or null `data` is an error; its shape is not checked here.
pub fn parse_offers(mut body: Value) -> Result<OffersPage, UpstreamError> {
    let data = match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => data,
        _ => {
            tracing::warn!("Flight offers response has no data member");
            return Err(UpstreamError::NoData);
        }
    };

    let locations = body
        .pointer("/dictionaries/locations")
        .cloned()
        .and_then(|locations| serde_json::from_value(locations).ok())
        .unwrap_or_default();

    Ok(OffersPage { data, locations })
}
