pub mod admin_service;
pub mod advertisement_service;
pub mod chart_service;
pub mod order_service;
pub mod product_service;
pub mod trend_service;
pub mod user_service;
pub mod vendor_service;
pub mod watchlist_service;
