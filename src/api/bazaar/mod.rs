pub mod client;
pub mod models;

pub use client::BazaarClient;
pub use models::ApiError;
