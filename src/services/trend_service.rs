//! 7-day price trend
//!
//! Pure computation over an already-fetched price history. Callers parse dates and
//! prices before getting here; every input, including an empty history, has a
//! defined result.

use chrono::Duration;

use crate::models::{PriceObservation, TrendResult};

/// How far back the reference price is taken from
pub const TREND_WINDOW_DAYS: i64 = 7;

/// Observations ordered oldest first, without touching the caller's slice
///
/// The sort is stable, so observations sharing a date keep their input order.
pub fn sorted_history(observations: &[PriceObservation]) -> Vec<PriceObservation> {
    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|obs| obs.date);
    sorted
}

/// Compare the latest price with the price recorded about a week before it
///
/// The reference is the most recent observation dated on or before
/// `latest date - 7 days`. When every observation is newer than that, the latest
/// price is its own reference and the change is zero.
pub fn calculate_trend(observations: &[PriceObservation]) -> TrendResult {
    let sorted = sorted_history(observations);

    let Some(latest) = sorted.last() else {
        return TrendResult::empty();
    };

    // No cutoff exists this close to the earliest representable instant
    let reference_price = latest
        .date
        .checked_sub_signed(Duration::days(TREND_WINDOW_DAYS))
        .and_then(|target_date| sorted.iter().rev().find(|obs| obs.date <= target_date))
        .map(|obs| obs.price)
        .unwrap_or(latest.price);

    let percent_change = percent_change(latest.price, reference_price);

    TrendResult {
        latest_price: latest.price,
        reference_price,
        percent_change,
        is_positive: percent_change >= 0.0,
    }
}

/// Change from `reference` to `latest` in percent, two decimals; zero when the reference is zero
pub fn percent_change(latest: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    round2((latest - reference) / reference * 100.0)
}

/// Adding 0.0 turns a rounded -0.0 into 0.0
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, price: f64) -> PriceObservation {
        PriceObservation::parse(date, &price.to_string()).unwrap()
    }

    #[test]
    fn test_reference_is_last_entry_before_cutoff() {
        let history = vec![
            obs("2024-01-01", 100.0),
            obs("2024-01-05", 110.0),
            obs("2024-01-10", 120.0),
        ];

        let trend = calculate_trend(&history);
        assert_eq!(trend.latest_price, 120.0);
        assert_eq!(trend.reference_price, 100.0);
        assert_eq!(trend.percent_change, 20.0);
        assert!(trend.is_positive);
    }

    #[test]
    fn test_single_observation_is_flat() {
        let trend = calculate_trend(&[obs("2024-03-01", 50.0)]);
        assert_eq!(trend.latest_price, 50.0);
        assert_eq!(trend.reference_price, 50.0);
        assert_eq!(trend.percent_change, 0.0);
        assert!(trend.is_positive);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(calculate_trend(&[]), TrendResult::empty());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let unsorted = vec![obs("2024-02-10", 90.0), obs("2024-02-01", 80.0)];
        let sorted = vec![obs("2024-02-01", 80.0), obs("2024-02-10", 90.0)];

        let trend = calculate_trend(&unsorted);
        assert_eq!(trend, calculate_trend(&sorted));
        assert_eq!(trend.reference_price, 80.0);
        assert_eq!(trend.percent_change, 12.5);
    }

    #[test]
    fn test_caller_slice_is_not_reordered() {
        let history = vec![obs("2024-02-10", 90.0), obs("2024-02-01", 80.0)];
        let before = history.clone();

        let first = calculate_trend(&history);
        let second = calculate_trend(&history);

        assert_eq!(history, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_within_window_is_zero() {
        let history = vec![
            obs("2024-05-01", 10.0),
            obs("2024-05-03", 30.0),
            obs("2024-05-07", 25.0),
        ];
        let trend = calculate_trend(&history);
        assert_eq!(trend.reference_price, 25.0);
        assert_eq!(trend.percent_change, 0.0);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let history = vec![obs("2024-01-01", 100.0), obs("2024-01-08", 90.0)];
        let trend = calculate_trend(&history);
        assert_eq!(trend.reference_price, 100.0);
        assert_eq!(trend.percent_change, -10.0);
        assert!(!trend.is_positive);
    }

    #[test]
    fn test_history_at_earliest_instant() {
        let earliest = chrono::DateTime::<chrono::Utc>::MIN_UTC.timestamp_millis();
        let history: Vec<PriceObservation> = serde_json::from_str(&format!(
            r#"[{{"date": {}, "price": 5}}, {{"date": {}, "price": 8}}]"#,
            earliest,
            earliest + 86_400_000
        ))
        .unwrap();

        let trend = calculate_trend(&history);
        assert_eq!(trend.latest_price, 8.0);
        assert_eq!(trend.reference_price, 8.0);
        assert_eq!(trend.percent_change, 0.0);
        assert!(trend.is_positive);
    }

    #[test]
    fn test_zero_reference_price() {
        let history = vec![obs("2024-01-01", 0.0), obs("2024-01-20", 40.0)];
        let trend = calculate_trend(&history);
        assert_eq!(trend.reference_price, 0.0);
        assert_eq!(trend.latest_price, 40.0);
        assert_eq!(trend.percent_change, 0.0);
        assert!(trend.is_positive);
    }

    #[test]
    fn test_duplicate_dates_resolve_positionally() {
        let history = vec![
            obs("2024-01-01", 100.0),
            obs("2024-01-01", 200.0),
            obs("2024-01-10", 220.0),
            obs("2024-01-10", 250.0),
        ];
        let trend = calculate_trend(&history);
        assert_eq!(trend.latest_price, 250.0);
        assert_eq!(trend.reference_price, 200.0);
        assert_eq!(trend.percent_change, 25.0);
    }

    #[test]
    fn test_tiny_drop_rounds_to_non_negative_zero() {
        assert_eq!(percent_change(99.999, 100.0), 0.0);
        assert!(percent_change(99.999, 100.0).is_sign_positive());
        assert_eq!(percent_change(1.0, 3.0), -66.67);
    }
}
