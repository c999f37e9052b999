use chrono::NaiveDate;
use tracing::info;

use crate::api::BazaarClient;
use crate::cache::{Mutation, QueryKey};
use crate::context::AppContext;
use crate::models::{PriceSort, Product, ProductFilter, ProductPage, Review, TrendResult};
use crate::services::trend_service;
use crate::session::Session;
use crate::utils::AppError;

/// Authenticated client when someone is signed in, anonymous otherwise
fn client_for(ctx: &AppContext, session: Option<&Session>) -> BazaarClient {
    match session {
        Some(session) => ctx.api_for(session),
        None => ctx.api.clone(),
    }
}

/// Public, paginated product listing
pub async fn list_products(
    ctx: &AppContext,
    session: Option<&Session>,
    filter: &ProductFilter,
) -> Result<ProductPage, AppError> {
    let api = client_for(ctx, session);
    ctx.cache
        .get_or_fetch(QueryKey::Products(filter.clone()), || async move {
            api.list_products(filter).await.map_err(AppError::from)
        })
        .await
}

pub async fn latest_products(
    ctx: &AppContext,
    session: Option<&Session>,
) -> Result<Vec<Product>, AppError> {
    let api = client_for(ctx, session);
    ctx.cache
        .get_or_fetch(QueryKey::LatestProducts, || async move {
            api.latest_products().await.map_err(AppError::from)
        })
        .await
}

/// Product details; signed-in users only
pub async fn get_product(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
) -> Result<Product, AppError> {
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::Product(product_id.to_string()), || async move {
            api.get_product(product_id).await.map_err(AppError::from)
        })
        .await
}

/// Product details together with its 7-day trend
pub async fn product_trend(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
) -> Result<(Product, TrendResult), AppError> {
    let product = get_product(ctx, session, product_id).await?;
    let trend = trend_service::calculate_trend(&product.price_history);
    Ok((product, trend))
}

pub async fn submit_review(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
    rating: u8,
    comment: &str,
) -> Result<(), AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::InvalidInput("Rating must be between 1 and 5".to_string()));
    }

    let review = Review {
        rating,
        comment: comment.trim().to_string(),
        user_name: session.display_name.clone(),
        user_email: session.email.clone(),
        user_photo_url: None,
    };

    ctx.api_for(session).submit_review(product_id, &review).await?;
    ctx.cache.invalidate(&Mutation::SubmitReview(product_id.to_string())).await;
    info!("{} reviewed product {} ({}★)", session.email, product_id, rating);
    Ok(())
}

/// Parse `products` arguments: `[page] [asc|desc] [from=YYYY-MM-DD] [to=YYYY-MM-DD] [q=text]`
pub fn parse_product_args(args: &[&str], page_size: u32) -> Result<ProductFilter, AppError> {
    let mut filter = ProductFilter::new(page_size);

    for arg in args {
        let lower = arg.to_lowercase();

        if let Ok(page) = lower.parse::<u32>() {
            if page == 0 {
                return Err(AppError::InvalidInput("Page numbers start at 1".to_string()));
            }
            filter.page = page;
        } else if lower == "asc" {
            filter.price_sort = Some(PriceSort::Asc);
        } else if lower == "desc" {
            filter.price_sort = Some(PriceSort::Desc);
        } else if let Some(date) = lower.strip_prefix("from=") {
            filter.start_date = Some(parse_day(date)?);
        } else if let Some(date) = lower.strip_prefix("to=") {
            filter.end_date = Some(parse_day(date)?);
        } else if arg.len() > 2 && lower.starts_with("q=") {
            filter.search = Some(arg[2..].to_string());
        } else {
            return Err(AppError::InvalidInput(format!(
                "Unknown argument '{}'. Usage: `products [page] [asc|desc] [from=YYYY-MM-DD] [to=YYYY-MM-DD] [q=text]`",
                arg
            )));
        }
    }

    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        if start > end {
            return Err(AppError::InvalidInput(
                "'from' date must not be after 'to' date".to_string(),
            ));
        }
    }
    if filter.start_date.is_some() != filter.end_date.is_some() {
        return Err(AppError::InvalidInput("Date filter needs both from= and to=".to_string()));
    }

    Ok(filter)
}

fn parse_day(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("Invalid date '{}'. Use YYYY-MM-DD", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_args() {
        let filter = parse_product_args(&["2", "desc", "from=2024-01-01", "to=2024-01-31", "q=Onion"], 10).unwrap();
        assert_eq!(filter.page, 2);
        assert_eq!(filter.price_sort, Some(PriceSort::Desc));
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(filter.search.as_deref(), Some("Onion"));
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn test_parse_product_args_defaults() {
        let filter = parse_product_args(&[], 25).unwrap();
        assert_eq!(filter, ProductFilter::new(25));
    }

    #[test]
    fn test_parse_product_args_rejects_bad_input() {
        assert!(parse_product_args(&["0"], 10).is_err());
        assert!(parse_product_args(&["cheapest"], 10).is_err());
        assert!(parse_product_args(&["from=2024-13-01", "to=2024-01-01"], 10).is_err());
        assert!(parse_product_args(&["from=2024-02-01", "to=2024-01-01"], 10).is_err());
        assert!(parse_product_args(&["from=2024-02-01"], 10).is_err());
    }
}
