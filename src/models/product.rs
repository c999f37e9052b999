//! Product listing models

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::observation::{deserialize_optional_date, deserialize_price, PriceObservation};

/// Moderation state of a vendor's product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Pending => write!(f, "pending"),
            ProductStatus::Approved => write!(f, "approved"),
            ProductStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A buyer's review attached to a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(rename = "userPhotoURL", default, skip_serializing_if = "Option::is_none")]
    pub user_photo_url: Option<String>,
}

/// A product as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub item_name: String,
    #[serde(default)]
    pub item_description: String,
    #[serde(default)]
    pub market_name: String,
    #[serde(default)]
    pub market_description: String,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_email: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price_per_unit: f64,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub price_history: Vec<PriceObservation>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|r| r.rating as u32).sum();
        Some(total as f64 / self.reviews.len() as f64)
    }
}

/// One page of the public product listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Vendor-editable product fields, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub item_name: String,
    #[serde(default)]
    pub item_description: String,
    pub market_name: String,
    #[serde(default)]
    pub market_description: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price_per_unit: f64,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub price_history: Vec<PriceObservation>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<DateTime<Utc>>,
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            item_name: product.item_name.clone(),
            item_description: product.item_description.clone(),
            market_name: product.market_name.clone(),
            market_description: product.market_description.clone(),
            price_per_unit: product.price_per_unit,
            product_image: product.product_image.clone(),
            price_history: product.price_history.clone(),
            date: product.date,
        }
    }
}

/// Body sent when a vendor creates or edits a product
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSubmission {
    #[serde(flatten)]
    pub draft: ProductDraft,
    pub vendor_name: String,
    pub vendor_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
}

/// Response to product creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub inserted_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceSort {
    Asc,
    Desc,
}

impl PriceSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSort::Asc => "asc",
            PriceSort::Desc => "desc",
        }
    }
}

/// Filters for the public product listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub price_sort: Option<PriceSort>,
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl ProductFilter {
    pub fn new(limit: u32) -> Self {
        Self {
            start_date: None,
            end_date: None,
            price_sort: None,
            search: None,
            page: 1,
            limit,
        }
    }

    /// Query string pairs; the date range is only sent when both ends are set
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            query.push(("startDate", start.format("%Y-%m-%d").to_string()));
            query.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(sort) = self.price_sort {
            query.push(("priceSort", sort.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        query.push(("page", self.page.to_string()));
        query.push(("limit", self.limit.to_string()));
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_api_json() {
        let json = r#"{
            "_id": "66a1",
            "itemName": "Onion",
            "marketName": "Karwan Bazar",
            "vendorEmail": "v@example.com",
            "pricePerUnit": "45",
            "priceHistory": [{"date": "2024-01-01", "price": "40"}],
            "date": "2024-01-01T00:00:00.000Z",
            "status": "approved",
            "reviews": [{"rating": 4, "comment": "fresh"}, {"rating": 5}]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, "66a1");
        assert_eq!(product.price_per_unit, 45.0);
        assert_eq!(product.status, ProductStatus::Approved);
        assert_eq!(product.price_history.len(), 1);
        assert_eq!(product.average_rating(), Some(4.5));
    }

    #[test]
    fn test_filter_query_omits_half_open_range() {
        let mut filter = ProductFilter::new(10);
        filter.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        filter.price_sort = Some(PriceSort::Desc);

        let query = filter.to_query();
        assert!(!query.iter().any(|(k, _)| *k == "startDate"));
        assert!(query.contains(&("priceSort", "desc".to_string())));
        assert!(query.contains(&("limit", "10".to_string())));

        filter.end_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        let query = filter.to_query();
        assert!(query.contains(&("startDate", "2024-01-01".to_string())));
        assert!(query.contains(&("endDate", "2024-02-01".to_string())));
    }

    #[test]
    fn test_submission_flattens_draft() {
        let draft = ProductDraft {
            item_name: "Rice".to_string(),
            item_description: String::new(),
            market_name: "New Market".to_string(),
            market_description: String::new(),
            price_per_unit: 60.0,
            product_image: None,
            price_history: Vec::new(),
            date: None,
        };
        let body = serde_json::to_value(ProductSubmission {
            draft,
            vendor_name: "Rahim".to_string(),
            vendor_email: "rahim@example.com".to_string(),
            status: Some(ProductStatus::Pending),
        })
        .unwrap();

        assert_eq!(body["itemName"], "Rice");
        assert_eq!(body["vendorEmail"], "rahim@example.com");
        assert_eq!(body["status"], "pending");
    }
}
