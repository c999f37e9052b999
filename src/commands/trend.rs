use crate::commands::usage;
use crate::context::AppContext;
use crate::services::{chart_service, product_service, trend_service};
use crate::session::{require_login, Session};
use crate::utils::{format_price, AppError};

pub async fn execute(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    tracing::info!("📊 Trend command called with args: {:?}", args);

    let session = require_login(session)?;
    let (product_id, want_chart) = match args {
        [id] => (*id, false),
        [id, flag] if flag.eq_ignore_ascii_case("chart") => (*id, true),
        _ => return Err(usage("trend <id> [chart]")),
    };

    let (product, trend) = product_service::product_trend(ctx, session, product_id).await?;

    if product.price_history.is_empty() {
        return Ok(format!("📭 {} has no recorded prices yet.", product.item_name));
    }

    let mut out = format!(
        "{} {} at {}\nLatest: {}\n{}-day reference: {}\nChange: {}",
        trend.arrow(),
        product.item_name,
        product.market_name,
        format_price(trend.latest_price),
        trend_service::TREND_WINDOW_DAYS,
        format_price(trend.reference_price),
        trend.signed_percent()
    );

    if want_chart {
        let path = chart_service::chart_path(&ctx.config.chart_dir, &product.id);
        let title = format!("{} @ {}", product.item_name, product.market_name);
        let written =
            chart_service::render_trend_chart(&title, &product.price_history, &trend, &path)?;
        out.push_str(&format!("\n🖼️ Chart saved to {}", written.display()));
    }

    Ok(out)
}
