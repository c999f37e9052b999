use crate::commands::products::product_table;
use crate::commands::{tail_after, usage};
use crate::context::AppContext;
use crate::models::{Role, UserAccount};
use crate::services::{admin_service, user_service};
use crate::session::{require_login, Session};
use crate::utils::{AppError, Table};

const USAGE: &str = "admin users|role <userId> <role>|products [pending]|approve <id>|reject <id> <feedback>|delete <id>|overview";

pub async fn execute(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
    rest: &str,
) -> Result<String, AppError> {
    tracing::info!("🛡️ Admin command called with args: {:?}", args);

    let session = require_login(session)?;
    session.require_role(Role::Admin)?;

    let subcommand = args.first().map(|s| s.to_lowercase()).unwrap_or_default();

    match (subcommand.as_str(), &args[args.len().min(1)..]) {
        ("users", []) => {
            let users = user_service::list_users(ctx, session).await?;
            Ok(format!("👥 Users ({})\n{}", users.len(), user_table(&users)))
        }
        ("role", [user_id, role]) => {
            let role: Role = role.parse().map_err(AppError::InvalidInput)?;
            let updated = user_service::change_role(ctx, session, user_id, role).await?;
            Ok(format!("✅ {} is now {}", updated.email, updated.role))
        }
        ("products", filter) if filter.len() <= 1 => {
            let products = admin_service::all_products(ctx, session).await?;
            let only_pending =
                matches!(filter.first(), Some(f) if f.eq_ignore_ascii_case("pending"));

            let shown: Vec<_> = if only_pending {
                admin_service::pending(&products).into_iter().cloned().collect()
            } else {
                products
            };
            if shown.is_empty() {
                return Ok("📭 No products to review.".to_string());
            }
            Ok(format!("🧺 Products ({})\n{}", shown.len(), product_table(&shown)))
        }
        ("approve", [product_id]) => {
            admin_service::approve_product(ctx, session, product_id).await?;
            Ok(format!("✅ Product {} approved", product_id))
        }
        ("reject", [product_id, _, ..]) => {
            let feedback = tail_after(rest, 2);
            admin_service::reject_product(ctx, session, product_id, feedback).await?;
            Ok(format!("❌ Product {} rejected: {}", product_id, feedback))
        }
        ("delete", [product_id]) => {
            admin_service::delete_product(ctx, session, product_id).await?;
            Ok(format!("🗑️ Product {} deleted", product_id))
        }
        ("overview", []) => {
            let stats = admin_service::overview(ctx, session).await?;
            let mut out = format!(
                "📈 Overview\nUsers: {}\nProducts: {}\nOrders: {}\nAverage rating: {:.1}",
                stats.total_users, stats.total_products, stats.total_orders, stats.avg_rating
            );
            if !stats.category_distribution.is_empty() {
                let mut table = Table::new(&["Category", "Value"]).align_right(&[1]);
                for share in &stats.category_distribution {
                    table.add_row(vec![share.name.clone(), format!("{:.2}", share.value)]);
                }
                out.push_str("\n\n");
                out.push_str(&table.render());
            }
            Ok(out)
        }
        _ => Err(usage(USAGE)),
    }
}

fn user_table(users: &[UserAccount]) -> String {
    let mut table = Table::new(&["ID", "Name", "Email", "Role"]);
    for user in users {
        table.add_row(vec![
            user.id.clone(),
            user.name.clone(),
            user.email.clone(),
            user.role.to_string(),
        ]);
    }
    table.render()
}
