use crate::commands::usage;
use crate::context::AppContext;
use crate::services::product_service;
use crate::session::{require_login, Session};
use crate::utils::AppError;

pub async fn execute(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    let session = require_login(session)?;
    if args.len() < 3 {
        return Err(usage("review <productId> <1-5> <comment>"));
    }

    let rating: u8 = args[1].parse().map_err(|_| {
        AppError::InvalidInput(format!(
            "Invalid rating '{}'. Use a number from 1 to 5",
            args[1]
        ))
    })?;
    let comment = args[2..].join(" ");

    product_service::submit_review(ctx, session, args[0], rating, &comment).await?;
    Ok(format!("⭐ Thanks! Your {}-star review was posted.", rating))
}
