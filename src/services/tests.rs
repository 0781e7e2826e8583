#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use serde_json::json;

    use crate::errors::{UpstreamError, ValidationError};
    use crate::models::{CityInfo, CityLookup, FlightQuery, OffersPage, PriceParams, RawFlightOffer};
    use crate::services::amadeus::parse_offers;
    use crate::services::{is_all_caps, normalize, TtlCache};

    fn params(origin: &str, destination: &str, date: &str) -> PriceParams {
        PriceParams {
            origin: Some(origin.to_string()),
            destination: Some(destination.to_string()),
            date: Some(date.to_string()),
            nocache: None,
        }
    }

    fn jfk_to_lhr() -> RawFlightOffer {
        serde_json::from_value(json!({
            "itineraries": [{
                "segments": [
                    {
                        "departure": { "iataCode": "JFK", "at": "2024-01-01T10:00:00" },
                        "arrival": { "iataCode": "KEF", "at": "2024-01-01T18:00:00" }
                    },
                    {
                        "departure": { "iataCode": "KEF", "at": "2024-01-01T20:00:00" },
                        "arrival": { "iataCode": "LHR", "at": "2024-01-02T00:10:00" }
                    }
                ]
            }],
            "price": { "total": "450.00", "currency": "USD" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("JFK_LHR_2024-01-01", "quote".to_string()).await;

        assert_eq!(cache.get("JFK_LHR_2024-01-01").await.as_deref(), Some("quote"));
        assert!(cache.get("JFK_CDG_2024-01-01").await.is_none());
        assert_eq!(cache.time_to_live(), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_cache_overwrite() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("key", 1u32).await;
        cache.set("key", 2u32).await;

        assert_eq!(cache.get("key").await, Some(2));
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = TtlCache::new(Duration::from_millis(50));
        for n in 0..100 {
            cache.set(&format!("key-{}", n), n).await;
        }
        assert_eq!(cache.get("key-7").await, Some(7));

        tokio::time::sleep(Duration::from_millis(150)).await;

        // Expired entries read as absent and are no longer stored
        assert!(cache.get("key-7").await.is_none());
        assert_eq!(cache.stored().await, 0);
    }

    #[tokio::test]
    async fn test_cache_expire_removes_entry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("key", 7u8).await;

        assert!(cache.expire("key").await);
        assert!(cache.get("key").await.is_none());
        assert!(!cache.expire("key").await);
    }

    #[test]
    fn test_valid_query() {
        let query = FlightQuery::from_params(&params("JFK", "LHR", "2024-01-01")).unwrap();

        assert_eq!(query.origin, "JFK");
        assert_eq!(query.destination, "LHR");
        assert_eq!(query.departure_date, "2024-01-01");
        assert_eq!(query.adults, 1);
        assert_eq!(query.cache_key(), "JFK_LHR_2024-01-01");
    }

    #[test]
    fn test_missing_parameters() {
        let mut missing_date = params("JFK", "LHR", "2024-01-01");
        missing_date.date = None;
        assert_eq!(
            FlightQuery::from_params(&missing_date),
            Err(ValidationError::MissingParameters)
        );

        // Empty values count as missing
        assert_eq!(
            FlightQuery::from_params(&params("", "LHR", "2024-01-01")),
            Err(ValidationError::MissingParameters)
        );

        assert_eq!(
            FlightQuery::from_params(&PriceParams::default()),
            Err(ValidationError::MissingParameters)
        );
    }

    #[test]
    fn test_rejects_lowercase_codes() {
        assert_eq!(
            FlightQuery::from_params(&params("jfk", "LHR", "2024-01-01")),
            Err(ValidationError::NotUppercase)
        );
        assert_eq!(
            FlightQuery::from_params(&params("JFK", "Lhr", "2024-01-01")),
            Err(ValidationError::NotUppercase)
        );
    }

    #[test]
    fn test_case_check_runs_before_date_check() {
        assert_eq!(
            FlightQuery::from_params(&params("jfk", "LHR", "2024/01/01")),
            Err(ValidationError::NotUppercase)
        );
    }

    #[test]
    fn test_date_format() {
        assert_eq!(
            FlightQuery::from_params(&params("JFK", "LHR", "2024/01/01")),
            Err(ValidationError::DateFormat)
        );
        assert_eq!(
            FlightQuery::from_params(&params("JFK", "LHR", "2024-1-01")),
            Err(ValidationError::DateFormat)
        );
        assert_eq!(
            FlightQuery::from_params(&params("JFK", "LHR", "2024-01-01T00:00")),
            Err(ValidationError::DateFormat)
        );
        // No trailing newline tolerance
        assert_eq!(
            FlightQuery::from_params(&params("JFK", "LHR", "2024-01-01\n")),
            Err(ValidationError::DateFormat)
        );
        assert!(FlightQuery::from_params(&params("JFK", "LHR", "2024-01-01")).is_ok());
    }

    #[test]
    fn test_params_last_value_wins() {
        let params: PriceParams = vec![
            ("origin".to_string(), "JFK".to_string()),
            ("origin".to_string(), "CDG".to_string()),
            ("destination".to_string(), "LHR".to_string()),
            ("date".to_string(), "2024-01-01".to_string()),
            ("currency".to_string(), "EUR".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(params.origin.as_deref(), Some("CDG"));
        assert_eq!(params.destination.as_deref(), Some("LHR"));
        assert!(!params.bypasses_cache());
    }

    #[test]
    fn test_all_caps_is_loose() {
        assert!(is_all_caps("JFK"));
        assert!(is_all_caps("LONDON"));
        assert!(is_all_caps("J1K"));
        assert!(!is_all_caps("123"));
        assert!(!is_all_caps("JfK"));
        assert!(!is_all_caps(""));
    }

    #[test]
    fn test_normalize_offer() {
        let quote = normalize(&jfk_to_lhr(), &CityLookup::new());

        assert_eq!(quote.origin, "JFK");
        assert_eq!(quote.destination, "LHR");
        assert_eq!(quote.departure_date, "2024-01-01");
        assert_eq!(quote.price, "450.00 USD");
    }

    #[test]
    fn test_normalize_resolves_city_code() {
        let mut lookup = HashMap::new();
        lookup.insert(
            "LHR".to_string(),
            CityInfo {
                city_code: Some("LON".to_string()),
                country_code: Some("GB".to_string()),
            },
        );

        let quote = normalize(&jfk_to_lhr(), &lookup);
        assert_eq!(quote.destination, "LON");
    }

    #[test]
    fn test_normalize_lookup_without_city_code_keeps_airport() {
        let mut lookup = HashMap::new();
        lookup.insert("LHR".to_string(), CityInfo::default());

        let quote = normalize(&jfk_to_lhr(), &lookup);
        assert_eq!(quote.destination, "LHR");
    }

    #[test]
    fn test_normalize_empty_itineraries() {
        let offer: RawFlightOffer = serde_json::from_value(json!({
            "itineraries": [],
            "price": { "total": "99.99" }
        }))
        .unwrap();

        let quote = normalize(&offer, &CityLookup::new());
        assert_eq!(quote.origin, "N/A");
        assert_eq!(quote.destination, "N/A");
        assert_eq!(quote.departure_date, "");
        assert_eq!(quote.price, "99.99 N/A");
    }

    #[test]
    fn test_normalize_null_itineraries() {
        let offer: RawFlightOffer = serde_json::from_value(json!({
            "itineraries": null,
            "price": { "total": "1.00", "currency": "EUR" }
        }))
        .unwrap();

        let quote = normalize(&offer, &CityLookup::new());
        assert_eq!(quote.origin, "N/A");
        assert_eq!(quote.destination, "N/A");
        assert_eq!(quote.departure_date, "");
        assert_eq!(quote.price, "1.00 EUR");
    }

    #[test]
    fn test_normalize_null_and_mistyped_fields() {
        let offer: RawFlightOffer = serde_json::from_value(json!({
            "itineraries": [{ "segments": null }],
            "price": { "total": 450.5, "currency": null }
        }))
        .unwrap();

        let quote = normalize(&offer, &CityLookup::new());
        assert_eq!(quote.origin, "N/A");
        assert_eq!(quote.price, "450.5 N/A");

        let offer: RawFlightOffer = serde_json::from_value(json!({
            "itineraries": [{
                "segments": [{
                    "departure": { "iataCode": 42, "at": null },
                    "arrival": "LHR"
                }]
            }],
            "price": "cheap"
        }))
        .unwrap();

        let quote = normalize(&offer, &CityLookup::new());
        assert_eq!(quote.origin, "N/A");
        assert_eq!(quote.destination, "N/A");
        assert_eq!(quote.departure_date, "");
        assert_eq!(quote.price, "N/A N/A");
    }

    #[test]
    fn test_normalize_bare_offer() {
        let quote = normalize(&RawFlightOffer::default(), &CityLookup::new());
        assert_eq!(quote.price, "N/A N/A");
        assert_eq!(quote.departure_date, "");
    }

    #[test]
    fn test_normalize_date_without_time() {
        let offer: RawFlightOffer = serde_json::from_value(json!({
            "itineraries": [{ "segments": [{ "departure": { "iataCode": "CDG", "at": "2024-05-06" } }] }]
        }))
        .unwrap();

        let quote = normalize(&offer, &CityLookup::new());
        assert_eq!(quote.origin, "CDG");
        assert_eq!(quote.departure_date, "2024-05-06");
        // Last segment has no arrival
        assert_eq!(quote.destination, "N/A");
    }

    #[test]
    fn test_parse_offers() {
        let page = parse_offers(json!({
            "meta": { "count": 1 },
            "data": [{ "id": "1" }],
            "dictionaries": {
                "locations": {
                    "LHR": { "cityCode": "LON", "countryCode": "GB" }
                }
            }
        }))
        .unwrap();

        assert_eq!(page.data, json!([{ "id": "1" }]));
        assert_eq!(
            page.locations.get("LHR").and_then(|c| c.city_code.as_deref()),
            Some("LON")
        );
    }

    #[test]
    fn test_parse_offers_without_data() {
        assert!(matches!(
            parse_offers(json!({ "errors": [] })),
            Err(UpstreamError::NoData)
        ));
        assert!(matches!(
            parse_offers(json!({ "data": null })),
            Err(UpstreamError::NoData)
        ));
        assert!(matches!(parse_offers(json!([1, 2])), Err(UpstreamError::NoData)));
    }

    #[test]
    fn test_parse_offers_ignores_bad_dictionary() {
        let page = parse_offers(json!({ "data": [], "dictionaries": { "locations": "oops" } })).unwrap();
        assert!(page.locations.is_empty());
    }

    #[test]
    fn test_first_offer() {
        let page = OffersPage {
            data: json!([{ "price": { "total": "1.00", "currency": "EUR" } }, {}]),
            ..OffersPage::default()
        };
        assert!(page.first_offer().is_some());

        let empty = OffersPage {
            data: json!([]),
            ..OffersPage::default()
        };
        assert!(empty.first_offer().is_none());

        let not_a_list = OffersPage {
            data: json!({ "id": "1" }),
            ..OffersPage::default()
        };
        assert!(not_a_list.first_offer().is_none());

        let null_itineraries = OffersPage {
            data: json!([{ "itineraries": null }]),
            ..OffersPage::default()
        };
        assert!(null_itineraries.first_offer().is_some());

        let not_an_offer = OffersPage {
            data: json!(["1"]),
            ..OffersPage::default()
        };
        assert!(not_an_offer.first_offer().is_none());
    }
}
