pub mod bazaar;

pub use bazaar::{ApiError, BazaarClient};
