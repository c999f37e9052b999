//! Admin dashboard overview models

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub name: String,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub avg_rating: f64,
    /// Passed through as-is; the shape is chart-specific
    #[serde(default)]
    pub sales_trend: Vec<serde_json::Value>,
    #[serde(default)]
    pub category_distribution: Vec<CategoryShare>,
}
