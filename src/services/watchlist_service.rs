use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{Mutation, QueryKey};
use crate::context::AppContext;
use crate::models::{NewWatchlistItem, Product, TrendResult, WatchlistItem};
use crate::services::{product_service, trend_service};
use crate::session::Session;
use crate::utils::AppError;

/// Trend for one watched product
#[derive(Debug)]
pub struct TrackedTrend {
    pub item: WatchlistItem,
    pub trend: Result<TrendResult, AppError>,
}

pub async fn watchlist(
    ctx: &AppContext,
    session: &Session,
) -> Result<Vec<WatchlistItem>, AppError> {
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::Watchlist(session.email.clone()), || async move {
            api.watchlist(&session.email).await.map_err(AppError::from)
        })
        .await
}

pub async fn add(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
) -> Result<NewWatchlistItem, AppError> {
    let existing = watchlist(ctx, session).await?;
    ensure_not_watched(&existing, product_id)?;

    let product = product_service::get_product(ctx, session, product_id).await?;
    let new_item = watch_entry(session, &product);

    ctx.api_for(session).add_to_watchlist(&new_item).await?;
    ctx.cache
        .invalidate(&Mutation::AddToWatchlist { email: session.email.clone() })
        .await;
    info!("{} is now watching {}", session.email, product_id);

    Ok(new_item)
}

fn ensure_not_watched(existing: &[WatchlistItem], product_id: &str) -> Result<(), AppError> {
    if existing.iter().any(|item| item.product_id == product_id) {
        return Err(AppError::InvalidInput(format!(
            "Product {} is already on your watchlist",
            product_id
        )));
    }
    Ok(())
}

/// Entry to post for `product`; the server assigns its id
fn watch_entry(session: &Session, product: &Product) -> NewWatchlistItem {
    NewWatchlistItem {
        product_id: product.id.clone(),
        product_name: product.item_name.clone(),
        product_image: product.product_image.clone(),
        market_name: product.market_name.clone(),
        user_email: session.email.clone(),
    }
}

pub async fn remove(ctx: &AppContext, session: &Session, watch_id: &str) -> Result<(), AppError> {
    ctx.api_for(session).remove_from_watchlist(watch_id).await?;
    ctx.cache
        .invalidate(&Mutation::RemoveFromWatchlist { email: session.email.clone() })
        .await;
    info!("{} removed watchlist entry {}", session.email, watch_id);
    Ok(())
}

/// 7-day trend of every watched product
///
/// One task per product fetches its record and runs the calculator. A failed
/// fetch is reported on that row only. Results keep watchlist order.
pub async fn tracked_trends(
    ctx: Arc<AppContext>,
    session: &Session,
) -> Result<Vec<TrackedTrend>, AppError> {
    let items = watchlist(&ctx, session).await?;

    let handles: Vec<_> = items
        .iter()
        .map(|item| {
            let ctx = Arc::clone(&ctx);
            let session = session.clone();
            let product_id = item.product_id.clone();
            tokio::spawn(async move {
                let product = product_service::get_product(&ctx, &session, &product_id).await?;
                Ok::<_, AppError>(trend_service::calculate_trend(&product.price_history))
            })
        })
        .collect();

    let mut tracked = Vec::with_capacity(items.len());
    for (item, handle) in items.into_iter().zip(handles) {
        let trend = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!("Trend task for {} failed: {}", item.product_id, e);
                Err(AppError::InvalidInput(format!("trend task failed: {}", e)))
            }
        };
        if let Err(e) = &trend {
            warn!("Could not compute trend for {}: {}", item.product_id, e);
        }
        tracked.push(TrackedTrend { item, trend });
    }

    Ok(tracked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn watcher() -> Session {
        Session {
            email: "watcher@example.com".to_string(),
            display_name: "Rafi".to_string(),
            access_token: "t".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_watch_entry_has_no_id() {
        let product: Product = serde_json::from_str(
            r#"{"_id": "p9", "itemName": "Hilsa", "marketName": "Karwan Bazar", "pricePerUnit": 900}"#,
        )
        .unwrap();

        let entry = watch_entry(&watcher(), &product);
        assert_eq!(entry.product_id, "p9");
        assert_eq!(entry.product_name, "Hilsa");
        assert_eq!(entry.market_name, "Karwan Bazar");
        assert_eq!(entry.user_email, "watcher@example.com");

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("_id").is_none());
        assert!(json.get("id").is_none());
        assert_eq!(json["productId"], "p9");
    }

    #[test]
    fn test_duplicate_watch_is_rejected() {
        let existing: Vec<WatchlistItem> =
            serde_json::from_str(r#"[{"_id": "w1", "productId": "p9", "productName": "Hilsa"}]"#)
                .unwrap();

        assert!(matches!(
            ensure_not_watched(&existing, "p9"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(ensure_not_watched(&existing, "p10").is_ok());
        assert!(ensure_not_watched(&[], "p9").is_ok());
    }
}
