use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::ValidationError;
use crate::models::{FlightQuery, PriceParams};

lazy_static! {
    static ref DATE_PATTERN: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

impl FlightQuery {
    /// Validates the price query string. Empty values count as missing.
    pub fn from_params(params: &PriceParams) -> Result<Self, ValidationError> {
        let (origin, destination, date) = match (
            present(&params.origin),
            present(&params.destination),
            present(&params.date),
        ) {
            (Some(origin), Some(destination), Some(date)) => (origin, destination, date),
            _ => return Err(ValidationError::MissingParameters),
        };

        if !(is_all_caps(origin) && is_all_caps(destination)) {
            return Err(ValidationError::NotUppercase);
        }

        if !DATE_PATTERN.is_match(date) {
            return Err(ValidationError::DateFormat);
        }

        Ok(FlightQuery::new(origin, destination, date))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// At least one uppercase letter and no lowercase ones. Length and
/// non-letters are not checked.
pub fn is_all_caps(code: &str) -> bool {
    code.chars().any(char::is_uppercase) && !code.chars().any(char::is_lowercase)
}
