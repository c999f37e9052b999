use tracing::info;

use crate::cache::{Mutation, QueryKey};
use crate::context::AppContext;
use crate::models::{OverviewStats, Product, ProductStatus, Role};
use crate::session::Session;
use crate::utils::AppError;

/// Every product regardless of status
pub async fn all_products(ctx: &AppContext, session: &Session) -> Result<Vec<Product>, AppError> {
    session.require_role(Role::Admin)?;
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::AllProducts, || async move {
            api.all_products().await.map_err(AppError::from)
        })
        .await
}

/// Products waiting for a moderation decision
pub fn pending(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| p.status == ProductStatus::Pending)
        .collect()
}

pub async fn approve_product(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
) -> Result<(), AppError> {
    session.require_role(Role::Admin)?;
    ctx.api_for(session).approve_product(product_id).await?;
    ctx.cache.invalidate(&Mutation::ApproveProduct(product_id.to_string())).await;
    info!("{} approved product {}", session.email, product_id);
    Ok(())
}

/// Rejection needs feedback the vendor can act on
pub async fn reject_product(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
    feedback: &str,
) -> Result<(), AppError> {
    session.require_role(Role::Admin)?;
    let feedback = feedback.trim();
    if feedback.is_empty() {
        return Err(AppError::InvalidInput(
            "Usage: `admin reject <id> <feedback>`".to_string(),
        ));
    }

    ctx.api_for(session).reject_product(product_id, feedback).await?;
    ctx.cache.invalidate(&Mutation::RejectProduct(product_id.to_string())).await;
    info!("{} rejected product {}: {}", session.email, product_id, feedback);
    Ok(())
}

pub async fn delete_product(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
) -> Result<(), AppError> {
    session.require_role(Role::Admin)?;
    ctx.api_for(session).delete_product(product_id).await?;
    ctx.cache.invalidate(&Mutation::DeleteProduct(product_id.to_string())).await;
    info!("{} deleted product {}", session.email, product_id);
    Ok(())
}

pub async fn overview(ctx: &AppContext, session: &Session) -> Result<OverviewStats, AppError> {
    session.require_role(Role::Admin)?;
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::Overview, || async move {
            api.overview().await.map_err(AppError::from)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_filter() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[
                {"_id": "p1", "itemName": "Onion", "marketName": "A", "vendorEmail": "v@x.com", "pricePerUnit": 50, "status": "pending"},
                {"_id": "p2", "itemName": "Rice", "marketName": "B", "vendorEmail": "v@x.com", "pricePerUnit": 70, "status": "approved"},
                {"_id": "p3", "itemName": "Egg", "marketName": "C", "vendorEmail": "v@x.com", "pricePerUnit": 12}
            ]"#,
        )
        .unwrap();

        let ids: Vec<&str> = pending(&products).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }
}
