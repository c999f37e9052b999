pub mod encryption;
pub mod errors;
pub mod page;
pub mod ratelimit;
pub mod table;

pub use encryption::{CryptoError, SessionCipher};
pub use errors::AppError;
pub use page::{server_footer, Page};
pub use ratelimit::RateLimiter;
pub use table::Table;

/// Format a price for display, e.g. `৳45.00`
pub fn format_price(price: f64) -> String {
    format!("৳{:.2}", price)
}

/// Split `"first | second"` into two trimmed parts
pub fn split_pipe(input: &str) -> Option<(String, String)> {
    let (left, right) = input.split_once('|')?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left.to_string(), right.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pipe() {
        assert_eq!(
            split_pipe("Fresh Mangoes | Best in town"),
            Some(("Fresh Mangoes".to_string(), "Best in town".to_string()))
        );
        assert_eq!(split_pipe("no separator"), None);
        assert_eq!(split_pipe(" | empty title"), None);
    }
}
