use crate::commands::{tail_after, usage};
use crate::context::AppContext;
use crate::models::Advertisement;
use crate::services::advertisement_service;
use crate::session::{require_login, Session};
use crate::utils::{split_pipe, AppError, Table};

/// `ads [current|mine|all]`
pub async fn list(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    let scope = args.first().map(|s| s.to_lowercase());

    let (title, ads) = match scope.as_deref() {
        None | Some("current") => (
            "📢 Current advertisements",
            advertisement_service::current_ads(ctx).await?,
        ),
        Some("mine") => (
            "📢 Your advertisements",
            advertisement_service::my_ads(ctx, require_login(session)?).await?,
        ),
        Some("all") => (
            "📢 All advertisements",
            advertisement_service::all_ads(ctx, require_login(session)?).await?,
        ),
        Some(_) => return Err(usage("ads [current|mine|all]")),
    };

    if ads.is_empty() {
        return Ok("📭 No advertisements to show.".to_string());
    }
    Ok(format!("{}\n{}", title, ad_table(&ads)))
}

/// `ad add|update|delete|status ...`; `rest` is the raw text after `ad`
pub async fn execute(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
    rest: &str,
) -> Result<String, AppError> {
    let session = require_login(session)?;
    let subcommand = args.first().map(|s| s.to_lowercase()).unwrap_or_default();

    match (subcommand.as_str(), args.len()) {
        ("add", _) => {
            let (title, description) = split_pipe(tail_after(rest, 1))
                .ok_or_else(|| usage("ad add <title> | <description>"))?;
            advertisement_service::add_ad(ctx, session, &title, &description).await?;
            Ok(format!("✅ Ad '{}' submitted for approval", title))
        }
        ("update", n) if n >= 3 => {
            let (title, description) = split_pipe(tail_after(rest, 2))
                .ok_or_else(|| usage("ad update <id> <title> | <description>"))?;
            advertisement_service::update_ad(ctx, session, args[1], &title, &description).await?;
            Ok(format!("✅ Ad {} updated and sent back for approval", args[1]))
        }
        ("delete", 2) => {
            advertisement_service::delete_ad(ctx, session, args[1]).await?;
            Ok(format!("🗑️ Ad {} deleted", args[1]))
        }
        ("status", 2) => {
            let status = advertisement_service::toggle_status(ctx, session, args[1]).await?;
            Ok(format!("🔁 Ad {} is now {}", args[1], status))
        }
        _ => Err(usage("ad add <title> | <description> | update <id> <title> | <description> | delete <id> | status <id>")),
    }
}

fn ad_table(ads: &[Advertisement]) -> String {
    let mut table = Table::new(&["ID", "Title", "Description", "Vendor", "Status"]);
    for ad in ads {
        table.add_row(vec![
            ad.id.clone(),
            ad.ad_title.clone(),
            ad.short_description.clone(),
            ad.vendor_name.clone(),
            ad.status.to_string(),
        ]);
    }
    table.render()
}
