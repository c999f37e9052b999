//! Data models for BazaarTrack commands and services
//!
//! Wire types mirror the remote API's camelCase JSON. Result types carry what a
//! service hands back to the command layer for display.

pub mod advertisement;
pub mod observation;
pub mod order;
pub mod overview;
pub mod product;
pub mod trend;
pub mod user;
pub mod watchlist;

pub use advertisement::{AdDraft, AdStatus, AdStatusUpdate, Advertisement};
pub use observation::{ObservationError, PriceObservation};
pub use order::{NewOrder, Order, PaymentIntent, PaymentIntentRequest, PurchaseResult};
pub use overview::OverviewStats;
pub use product::{
    InsertAck, PriceSort, Product, ProductDraft, ProductFilter, ProductPage, ProductStatus,
    ProductSubmission, Review,
};
pub use trend::TrendResult;
pub use user::{NewUser, Role, RoleResponse, RoleUpdate, UserAccount};
pub use watchlist::{NewWatchlistItem, WatchlistItem};
