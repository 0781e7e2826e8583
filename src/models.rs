use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::{DEFAULT_ADULTS, NO_CACHE_FLAG, QUOTE_TTL_SECS};
use crate::services::{OfferSource, TtlCache};

#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<TtlCache<NormalizedQuote>>,
    pub offers: Arc<dyn OfferSource>,
    pub resolve_city_codes: bool,
}

impl AppState {
    pub fn new(offers: Arc<dyn OfferSource>) -> Self {
        Self {
            quotes: Arc::new(TtlCache::new(Duration::from_secs(QUOTE_TTL_SECS))),
            offers,
            resolve_city_codes: false,
        }
    }

    pub fn with_city_resolution(mut self, enabled: bool) -> Self {
        self.resolve_city_codes = enabled;
        self
    }
}

/// Bearer credential. Its lifetime is owned by the token cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
}

/// Raw query string of `GET /flights/price/`.
#[derive(Debug, Default)]
pub struct PriceParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub nocache: Option<String>,
}

impl PriceParams {
    pub fn bypasses_cache(&self) -> bool {
        self.nocache.as_deref() == Some(NO_CACHE_FLAG)
    }
}

/// Repeated parameters keep their last value; unknown ones are ignored.
impl FromIterator<(String, String)> for PriceParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = PriceParams::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "origin" => &mut params.origin,
                "destination" => &mut params.destination,
                "date" => &mut params.date,
                "nocache" => &mut params.nocache,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub adults: u32,
}

impl FlightQuery {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: departure_date.into(),
            adults: DEFAULT_ADULTS,
        }
    }

    pub fn cache_key(&self) -> String {
        format!("{}_{}_{}", self.origin, self.destination, self.departure_date)
    }
}

// Upstream flight offer. Every field is optional and a null or mistyped
// field decodes as absent; defaults are resolved once, in the normalizer.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFlightOffer {
    #[serde(deserialize_with = "lenient")]
    pub itineraries: Vec<Itinerary>,
    #[serde(deserialize_with = "lenient")]
    pub price: Option<OfferPrice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Itinerary {
    #[serde(deserialize_with = "lenient")]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Segment {
    #[serde(deserialize_with = "lenient")]
    pub departure: Option<SegmentEndpoint>,
    #[serde(deserialize_with = "lenient")]
    pub arrival: Option<SegmentEndpoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentEndpoint {
    #[serde(deserialize_with = "lenient")]
    pub iata_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub at: Option<String>,
}

/// `total` and `currency` are rendered as given, whatever their JSON type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OfferPrice {
    pub total: Option<Value>,
    pub currency: Option<Value>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CityInfo {
    pub city_code: Option<String>,
    pub country_code: Option<String>,
}

pub type CityLookup = HashMap<String, CityInfo>;

/// Successful offers response: the untouched `data` member plus the
/// location dictionary shipped next to it.
#[derive(Debug, Clone, Default)]
pub struct OffersPage {
    pub data: Value,
    pub locations: CityLookup,
}

impl OffersPage {
    /// First offer, if `data` is a non-empty list whose head is an object.
    pub fn first_offer(&self) -> Option<RawFlightOffer> {
        let first = self.data.as_array()?.first()?;
        if !first.is_object() {
            return None;
        }
        serde_json::from_value(first.clone()).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuote {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub price: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}
