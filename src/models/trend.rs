//! Price trend models

use serde::Serialize;

/// Short-term price movement derived from an item's price history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub latest_price: f64,
    pub reference_price: f64,
    /// Rounded to two decimal places
    pub percent_change: f64,
    pub is_positive: bool,
}

impl TrendResult {
    /// Result for an item with no price history
    pub fn empty() -> Self {
        Self {
            latest_price: 0.0,
            reference_price: 0.0,
            percent_change: 0.0,
            is_positive: true,
        }
    }

    /// e.g. `+20.00%` or `-3.50%`
    pub fn signed_percent(&self) -> String {
        if self.is_positive {
            format!("+{:.2}%", self.percent_change)
        } else {
            format!("{:.2}%", self.percent_change)
        }
    }

    pub fn arrow(&self) -> &'static str {
        if self.is_positive {
            "📈"
        } else {
            "📉"
        }
    }
}
