use crate::commands::usage;
use crate::context::AppContext;
use crate::models::Product;
use crate::services::{product_service, trend_service};
use crate::session::{require_login, Session};
use crate::utils::{format_price, server_footer, AppError, Table};

pub async fn list(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    tracing::info!("🛒 Products command called with args: {:?}", args);

    let filter = product_service::parse_product_args(args, ctx.config.page_size)?;
    let page = product_service::list_products(ctx, session, &filter).await?;

    if page.products.is_empty() {
        return Ok("📭 No products match these filters.".to_string());
    }

    let mut out = product_table(&page.products);
    out.push('\n');
    out.push_str(&server_footer(filter.page, page.total_pages, "products"));
    Ok(out)
}

pub async fn latest(ctx: &AppContext, session: Option<&Session>) -> Result<String, AppError> {
    let products = product_service::latest_products(ctx, session).await?;
    if products.is_empty() {
        return Ok("📭 No products have been listed yet.".to_string());
    }
    Ok(format!("🆕 Latest products\n{}", product_table(&products)))
}

pub async fn show(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    let session = require_login(session)?;
    let product_id = args.first().ok_or_else(|| usage("product <id>"))?;

    let (product, trend) = product_service::product_trend(ctx, session, product_id).await?;

    let mut out = format!(
        "🧺 {} ({})\n🏬 {}\n👤 {} <{}>\n💰 {} per unit\n{} {} over 7 days (from {})\nStatus: {}",
        product.item_name,
        product.id,
        product.market_name,
        product.vendor_name,
        product.vendor_email,
        format_price(product.price_per_unit),
        trend.arrow(),
        trend.signed_percent(),
        format_price(trend.reference_price),
        product.status
    );
    if let Some(feedback) = &product.feedback {
        out.push_str(&format!("\nFeedback: {}", feedback));
    }
    if !product.item_description.is_empty() {
        out.push_str(&format!("\n\n{}", product.item_description));
    }

    let history = trend_service::sorted_history(&product.price_history);
    if !history.is_empty() {
        let mut table = Table::new(&["Date", "Price"]).align_right(&[1]);
        for obs in history.iter().rev() {
            table.add_row(vec![obs.date.format("%Y-%m-%d").to_string(), format_price(obs.price)]);
        }
        out.push_str("\n\n📅 Price history\n");
        out.push_str(&table.render());
    }

    match product.average_rating() {
        Some(avg) => {
            out.push_str(&format!("\n\n⭐ {:.1} from {} review(s)", avg, product.reviews.len()));
            for review in &product.reviews {
                out.push_str(&format!(
                    "\n  {}★ {}: {}",
                    review.rating, review.user_name, review.comment
                ));
            }
        }
        None => out.push_str("\n\n⭐ No reviews yet"),
    }

    Ok(out)
}

/// Listing table shared by the product commands
pub fn product_table(products: &[Product]) -> String {
    let mut table =
        Table::new(&["ID", "Item", "Market", "Price", "7d", "Date"]).align_right(&[3, 4]);
    for product in products {
        let trend = trend_service::calculate_trend(&product.price_history);
        table.add_row(vec![
            product.id.clone(),
            product.item_name.clone(),
            product.market_name.clone(),
            format_price(product.price_per_unit),
            trend.signed_percent(),
            product
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.render()
}
