use std::path::Path;

use chrono::Utc;

use crate::commands::usage;
use crate::commands::products::product_table;
use crate::context::AppContext;
use crate::models::{PriceObservation, Product, ProductStatus};
use crate::models::observation::{parse_date, parse_price};
use crate::services::{trend_service, vendor_service};
use crate::session::{require_login, Session};
use crate::utils::{format_price, AppError, Table};

const USAGE: &str = "vendor products|add <file.json>|update <id> <file.json>|delete <id>|price <id> <price> [YYYY-MM-DD]";

pub async fn execute(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    tracing::info!("🏪 Vendor command called with args: {:?}", args);

    let session = require_login(session)?;
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(usage(USAGE));
    };

    match (subcommand.to_lowercase().as_str(), rest) {
        ("products" | "list", []) => products(ctx, session).await,
        ("add", [file]) => {
            let draft = vendor_service::load_draft(Path::new(file)).await?;
            let name = draft.item_name.clone();
            let ack = vendor_service::add_product(ctx, session, draft).await?;
            Ok(format!(
                "✅ {} submitted for review{}",
                name,
                ack.inserted_id
                    .map(|id| format!(" (id {})", id))
                    .unwrap_or_default()
            ))
        }
        ("update", [product_id, file]) => {
            let draft = vendor_service::load_draft(Path::new(file)).await?;
            vendor_service::update_product(ctx, session, product_id, draft).await?;
            Ok(format!("✅ Product {} updated", product_id))
        }
        ("delete", [product_id]) => {
            vendor_service::delete_product(ctx, session, product_id).await?;
            Ok(format!("🗑️ Product {} deleted", product_id))
        }
        ("price", [product_id, price, date @ ..]) if date.len() <= 1 => {
            let observation = PriceObservation::new(
                match date.first() {
                    Some(raw) => parse_date(raw)?,
                    None => Utc::now(),
                },
                parse_price(price)?,
            )?;
            let product =
                vendor_service::record_price(ctx, session, product_id, observation).await?;
            let trend = trend_service::calculate_trend(&product.price_history);
            Ok(format!(
                "✅ Recorded {} for {} on {}\n{} {} over 7 days",
                format_price(observation.price),
                product.item_name,
                observation.date.format("%Y-%m-%d"),
                trend.arrow(),
                trend.signed_percent()
            ))
        }
        _ => Err(usage(USAGE)),
    }
}

async fn products(ctx: &AppContext, session: &Session) -> Result<String, AppError> {
    let products = vendor_service::my_products(ctx, session).await?;
    if products.is_empty() {
        return Ok("📭 You have not listed any products. Use `vendor add <file.json>`.".to_string());
    }

    let mut out = format!("🏪 Your products\n{}", product_table(&products));

    let rejected: Vec<&Product> = products
        .iter()
        .filter(|p| p.status == ProductStatus::Rejected)
        .collect();
    if !rejected.is_empty() {
        let mut table = Table::new(&["ID", "Item", "Feedback"]);
        for product in rejected {
            table.add_row(vec![
                product.id.clone(),
                product.item_name.clone(),
                product.feedback.clone().unwrap_or_default(),
            ]);
        }
        out.push_str("\n\n❌ Rejected\n");
        out.push_str(&table.render());
    }

    let pending = products.iter().filter(|p| p.status == ProductStatus::Pending).count();
    if pending > 0 {
        out.push_str(&format!("\n\n⏳ {} product(s) awaiting approval", pending));
    }
    Ok(out)
}
