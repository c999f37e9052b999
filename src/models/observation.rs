//! Price history models
//!
//! The remote API has stored price history in several shapes over time: dates as
//! RFC 3339 strings, bare `YYYY-MM-DD` strings or millisecond timestamps, and prices
//! as numbers or numeric strings. Everything is normalised here so the trend code
//! only ever sees a UTC instant and a non-negative `f64`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Reasons an observation cannot be built from raw input
#[derive(Debug, Error, PartialEq)]
pub enum ObservationError {
    #[error("Invalid date: '{0}'")]
    InvalidDate(String),
    #[error("Invalid price: '{0}'")]
    InvalidPrice(String),
    #[error("Price cannot be negative: {0}")]
    NegativePrice(f64),
}

/// One historical price point for a tracked item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceObservation {
    pub date: DateTime<Utc>,
    pub price: f64,
}

impl PriceObservation {
    pub fn new(date: DateTime<Utc>, price: f64) -> Result<Self, ObservationError> {
        Ok(Self {
            date,
            price: check_price(price)?,
        })
    }

    /// Build an observation from user-supplied text, e.g. `("2024-01-10", "120.5")`
    pub fn parse(date: &str, price: &str) -> Result<Self, ObservationError> {
        Self::new(parse_date(date)?, parse_price(price)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
struct RawObservation {
    date: RawDate,
    price: RawPrice,
}

impl RawDate {
    fn resolve(self) -> Result<DateTime<Utc>, ObservationError> {
        match self {
            RawDate::Millis(ms) => from_millis(ms),
            RawDate::FractionalMillis(ms) => from_millis(ms.round() as i64),
            RawDate::Text(text) => parse_date(&text),
        }
    }
}

impl RawPrice {
    fn resolve(self) -> Result<f64, ObservationError> {
        match self {
            RawPrice::Number(n) => check_price(n),
            RawPrice::Text(text) => parse_price(&text),
        }
    }
}

impl<'de> Deserialize<'de> for PriceObservation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawObservation::deserialize(deserializer)?;
        Ok(PriceObservation {
            date: raw.date.resolve().map_err(de::Error::custom)?,
            price: raw.price.resolve().map_err(de::Error::custom)?,
        })
    }
}

/// Parse a date in any of the formats the API has used
pub fn parse_date(input: &str) -> Result<DateTime<Utc>, ObservationError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ObservationError::InvalidDate(input.to_string()))
}

pub fn from_millis(ms: i64) -> Result<DateTime<Utc>, ObservationError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| ObservationError::InvalidDate(ms.to_string()))
}

pub fn parse_price(input: &str) -> Result<f64, ObservationError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ObservationError::InvalidPrice(input.to_string()))?;
    check_price(value)
}

fn check_price(value: f64) -> Result<f64, ObservationError> {
    if !value.is_finite() {
        return Err(ObservationError::InvalidPrice(value.to_string()));
    }
    if value < 0.0 {
        return Err(ObservationError::NegativePrice(value));
    }
    Ok(value)
}

/// serde helper for price fields that may arrive as numbers or numeric strings
pub fn deserialize_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    RawPrice::deserialize(deserializer)?
        .resolve()
        .map_err(de::Error::custom)
}

/// serde helper for optional date fields in any supported representation
pub fn deserialize_optional_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<RawDate>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawDate::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(raw) => raw.resolve().map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-01-10").unwrap(), expected);
        assert_eq!(parse_date("2024-01-10T00:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_date("2024-01-10 00:00:00").unwrap(), expected);
        assert_eq!(parse_date("2024-01-10T02:00:00+02:00").unwrap(), expected);
        assert!(matches!(parse_date("10/01/2024"), Err(ObservationError::InvalidDate(_))));
    }

    #[test]
    fn test_deserialize_mixed_representations() {
        let json = r#"[
            {"date": "2024-01-01T00:00:00.000Z", "price": "100"},
            {"date": 1704412800000, "price": 110.5},
            {"date": "2024-01-10", "price": 120}
        ]"#;
        let parsed: Vec<PriceObservation> = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].price, 100.0);
        assert_eq!(parsed[1].date, Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());
        assert_eq!(parsed[1].price, 110.5);
        assert_eq!(parsed[2].price, 120.0);
    }

    #[test]
    fn test_rejects_negative_and_empty_prices() {
        assert_eq!(
            PriceObservation::parse("2024-01-01", "-5"),
            Err(ObservationError::NegativePrice(-5.0))
        );
        assert!(matches!(
            PriceObservation::parse("2024-01-01", ""),
            Err(ObservationError::InvalidPrice(_))
        ));

        let json = r#"{"date": "2024-01-01", "price": ""}"#;
        assert!(serde_json::from_str::<PriceObservation>(json).is_err());
    }
}
