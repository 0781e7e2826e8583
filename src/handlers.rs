use std::convert::Infallible;

use hyper::StatusCode;
use serde_json::json;
use warp::{Filter, Rejection, Reply};

use crate::errors::GatewayError;
use crate::models::{AppState, CityLookup, DataEnvelope, FlightQuery, NormalizedQuote, PriceParams};
use crate::services::normalize;


/// `GET /flights/ping/` and `GET /flights/price/`, with every rejection
/// turned into a JSON error body.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let ping_route = warp::path!("flights" / "ping")
        .and(warp::get())
        .map(ping);

    let price_route = warp::path!("flights" / "price")
        .and(warp::get())
        .and(warp::query::<Vec<(String, String)>>().map(|pairs: Vec<(String, String)>| {
            pairs.into_iter().collect::<PriceParams>()
        }))
        .and(state_filter)
        .and_then(flight_price);

    ping_route.or(price_route).recover(handle_rejection)
}

pub fn ping() -> impl Reply {
    warp::reply::json(&DataEnvelope { data: "pong" })
}

pub async fn flight_price(params: PriceParams, state: AppState) -> Result<impl Reply, Rejection> {
    let query = FlightQuery::from_params(&params)
        .map_err(|e| warp::reject::custom(GatewayError::from(e)))?;

    let quote = resolve_quote(&query, params.bypasses_cache(), &state)
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&DataEnvelope { data: quote }))
}

/// Read-through lookup: cached quote unless `bypass_cache`, otherwise fetch,
/// normalize the first offer and store it for the next caller.
pub async fn resolve_quote(
    query: &FlightQuery,
    bypass_cache: bool,
    state: &AppState,
) -> Result<NormalizedQuote, GatewayError> {
    let cache_key = query.cache_key();

    if !bypass_cache {
        if let Some(quote) = state.quotes.get(&cache_key).await {
            tracing::debug!(%cache_key, "Serving cached quote");
            return Ok(quote);
        }
    }

    let page = state.offers.fetch_offers(query).await?;

    let offer = page.first_offer().ok_or_else(|| {
        tracing::warn!(%cache_key, "Flight offers response was not a non-empty list");
        GatewayError::UnexpectedFormat
    })?;

    let no_cities = CityLookup::new();
    let city_lookup = if state.resolve_city_codes {
        &page.locations
    } else {
        &no_cities
    };

    let quote = normalize(&offer, city_lookup);
    state.quotes.set(&cache_key, quote.clone()).await;

    Ok(quote)
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(e) = err.find::<GatewayError>() {
        match e {
            GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        tracing::error!(?err, "Unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        code,
    ))
}
