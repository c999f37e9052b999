use std::sync::Arc;

use crate::commands::usage;
use crate::context::AppContext;
use crate::services::watchlist_service;
use crate::session::{require_login, Session};
use crate::utils::{format_price, AppError, Page, Table};

fn page_arg(args: &[&str]) -> Result<usize, AppError> {
    match args.first() {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid page number '{}'", raw))),
        None => Ok(1),
    }
}

pub async fn list(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    let session = require_login(session)?;
    let page_num = page_arg(args)?;

    let items = watchlist_service::watchlist(ctx, session).await?;
    if items.is_empty() {
        return Ok("👀 Your watchlist is empty. Use `watch <productId>` to track a product.".to_string());
    }

    let page = Page::of(&items, page_num, ctx.config.page_size as usize)?;
    let mut table = Table::new(&["Watch ID", "Product ID", "Item", "Market"]);
    for item in page.items {
        table.add_row(vec![
            item.id.clone(),
            item.product_id.clone(),
            item.product_name.clone(),
            item.market_name.clone().unwrap_or_default(),
        ]);
    }

    Ok(format!("👀 Watchlist\n{}\n{}", table.render(), page.footer("watchlist")))
}

pub async fn watch(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    let session = require_login(session)?;
    let [product_id] = args else {
        return Err(usage("watch <productId>"));
    };

    let item = watchlist_service::add(ctx, session, product_id).await?;
    Ok(format!("✅ Now watching {}", item.product_name))
}

pub async fn unwatch(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    let session = require_login(session)?;
    let [watch_id] = args else {
        return Err(usage("unwatch <watchId>"));
    };

    watchlist_service::remove(ctx, session, watch_id).await?;
    Ok(format!("🗑️ Removed {} from your watchlist", watch_id))
}

pub async fn trends(ctx: &Arc<AppContext>, session: Option<&Session>) -> Result<String, AppError> {
    let session = require_login(session)?;
    let tracked = watchlist_service::tracked_trends(Arc::clone(ctx), session).await?;

    if tracked.is_empty() {
        return Ok("👀 Your watchlist is empty. Use `watch <productId>` to track a product.".to_string());
    }

    let mut table = Table::new(&["Item", "Market", "Latest", "7 days ago", "Change"])
        .align_right(&[2, 3, 4]);
    for entry in &tracked {
        let market = entry.item.market_name.clone().unwrap_or_default();
        match &entry.trend {
            Ok(trend) => table.add_row(vec![
                entry.item.product_name.clone(),
                market,
                format_price(trend.latest_price),
                format_price(trend.reference_price),
                format!("{} {}", trend.arrow(), trend.signed_percent()),
            ]),
            Err(_) => table.add_row(vec![
                entry.item.product_name.clone(),
                market,
                "-".to_string(),
                "-".to_string(),
                "unavailable".to_string(),
            ]),
        }
    }

    Ok(format!("📊 Weekly trends\n{}", table.render()))
}
