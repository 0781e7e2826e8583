use serde_json::Value;

use crate::models::{CityLookup, NormalizedQuote, RawFlightOffer, SegmentEndpoint};

const NOT_AVAILABLE: &str = "N/A";

/// Flattens an offer into the caller-facing quote. Never fails: missing
/// pieces fall back to "N/A" (or an empty date).
pub fn normalize(offer: &RawFlightOffer, city_lookup: &CityLookup) -> NormalizedQuote {
    let empty = SegmentEndpoint::default();
    let segments = offer
        .itineraries
        .first()
        .map(|itinerary| itinerary.segments.as_slice())
        .unwrap_or_default();

    let departure = segments
        .first()
        .and_then(|segment| segment.departure.as_ref())
        .unwrap_or(&empty);
    let arrival = segments
        .last()
        .and_then(|segment| segment.arrival.as_ref())
        .unwrap_or(&empty);

    let destination_iata = arrival.iata_code.as_deref().unwrap_or(NOT_AVAILABLE);
    let destination = city_lookup
        .get(destination_iata)
        .and_then(|city| city.city_code.as_deref())
        .unwrap_or(destination_iata);

    let departure_date = departure
        .at
        .as_deref()
        .map(|at| at.split('T').next().unwrap_or_default())
        .unwrap_or_default();

    let price = offer.price.as_ref();
    let total = render(price.and_then(|p| p.total.as_ref()));
    let currency = render(price.and_then(|p| p.currency.as_ref()));

    NormalizedQuote {
        origin: departure
            .iata_code
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        destination: destination.to_string(),
        departure_date: departure_date.to_string(),
        price: format!("{} {}", total, currency),
    }
}

/// Strings as-is, other JSON values as their JSON text, null or absent as "N/A".
fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
