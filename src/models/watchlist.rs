//! Watchlist models

use serde::{Deserialize, Serialize};

/// A product a user is tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub market_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchlistItem {
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub market_name: String,
    pub user_email: String,
}
