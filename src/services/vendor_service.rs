use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::cache::{Mutation, QueryKey};
use crate::context::AppContext;
use crate::models::{
    InsertAck, PriceObservation, Product, ProductDraft, ProductStatus, ProductSubmission, Role,
};
use crate::services::{product_service, trend_service};
use crate::session::Session;
use crate::utils::AppError;

/// Read a product draft from a JSON file
pub async fn load_draft(path: &Path) -> Result<ProductDraft, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::InvalidInput(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    let draft: ProductDraft = serde_json::from_str(&raw)?;
    validate_draft(&draft)?;
    Ok(draft)
}

pub fn validate_draft(draft: &ProductDraft) -> Result<(), AppError> {
    if draft.item_name.trim().is_empty() {
        return Err(AppError::InvalidInput("itemName cannot be empty".to_string()));
    }
    if draft.market_name.trim().is_empty() {
        return Err(AppError::InvalidInput("marketName cannot be empty".to_string()));
    }
    if draft.price_history.is_empty() {
        return Err(AppError::InvalidInput(
            "priceHistory needs at least one observation".to_string(),
        ));
    }
    Ok(())
}

fn submission(
    session: &Session,
    draft: ProductDraft,
    status: Option<ProductStatus>,
) -> ProductSubmission {
    ProductSubmission {
        draft,
        vendor_name: session.display_name.clone(),
        vendor_email: session.email.clone(),
        status,
    }
}

pub async fn my_products(ctx: &AppContext, session: &Session) -> Result<Vec<Product>, AppError> {
    session.require_role(Role::Vendor)?;
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::VendorProducts(session.email.clone()), || async move {
            api.vendor_products(&session.email).await.map_err(AppError::from)
        })
        .await
}

/// New products start out pending until an admin approves them
pub async fn add_product(
    ctx: &AppContext,
    session: &Session,
    mut draft: ProductDraft,
) -> Result<InsertAck, AppError> {
    session.require_role(Role::Vendor)?;
    validate_draft(&draft)?;
    draft.date.get_or_insert_with(Utc::now);

    let ack = ctx
        .api_for(session)
        .add_product(&submission(session, draft, Some(ProductStatus::Pending)))
        .await?;

    if !ack.acknowledged {
        let reason = ack
            .message
            .unwrap_or_else(|| "the API did not acknowledge the product".to_string());
        return Err(AppError::InvalidInput(reason));
    }

    ctx.cache.invalidate(&Mutation::AddProduct).await;
    info!("{} added product {:?}", session.email, ack.inserted_id);
    Ok(ack)
}

/// Fetch a product and make sure the signed-in vendor owns it
async fn owned_product(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
) -> Result<Product, AppError> {
    session.require_role(Role::Vendor)?;
    let product = product_service::get_product(ctx, session, product_id).await?;
    if !product.vendor_email.eq_ignore_ascii_case(&session.email) {
        return Err(AppError::InvalidInput(format!(
            "Product {} belongs to another vendor",
            product_id
        )));
    }
    Ok(product)
}

pub async fn update_product(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
    draft: ProductDraft,
) -> Result<(), AppError> {
    owned_product(ctx, session, product_id).await?;
    validate_draft(&draft)?;

    ctx.api_for(session)
        .update_product(product_id, &submission(session, draft, None))
        .await?;
    ctx.cache.invalidate(&Mutation::UpdateProduct(product_id.to_string())).await;
    info!("{} updated product {}", session.email, product_id);
    Ok(())
}

pub async fn delete_product(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
) -> Result<(), AppError> {
    owned_product(ctx, session, product_id).await?;

    ctx.api_for(session).delete_product(product_id).await?;
    ctx.cache.invalidate(&Mutation::DeleteProduct(product_id.to_string())).await;
    info!("{} deleted product {}", session.email, product_id);
    Ok(())
}

/// Append a price observation to a product's history
///
/// The listed unit price follows the newest observation.
pub async fn record_price(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
    observation: PriceObservation,
) -> Result<Product, AppError> {
    let product = owned_product(ctx, session, product_id).await?;

    let mut draft = ProductDraft::from(&product);
    draft.price_history.push(observation);
    if let Some(newest) = trend_service::sorted_history(&draft.price_history).last() {
        draft.price_per_unit = newest.price;
    }

    ctx.api_for(session)
        .update_product(product_id, &submission(session, draft.clone(), None))
        .await?;
    ctx.cache.invalidate(&Mutation::UpdateProduct(product_id.to_string())).await;
    info!(
        "{} recorded price {} for product {} on {}",
        session.email,
        observation.price,
        product_id,
        observation.date.format("%Y-%m-%d")
    );

    Ok(Product {
        price_per_unit: draft.price_per_unit,
        price_history: draft.price_history,
        ..product
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_json(history: &str) -> String {
        format!(
            r#"{{"itemName": "Potato", "marketName": "Kawran Bazar", "pricePerUnit": "30", "priceHistory": {}}}"#,
            history
        )
    }

    #[test]
    fn test_validate_draft() {
        let draft: ProductDraft = serde_json::from_str(&draft_json(r#"[{"date": "2024-01-01", "price": 30}]"#)).unwrap();
        assert!(validate_draft(&draft).is_ok());
        assert_eq!(draft.price_per_unit, 30.0);

        let empty: ProductDraft = serde_json::from_str(&draft_json("[]")).unwrap();
        assert!(matches!(validate_draft(&empty), Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_load_draft_from_file() {
        let path = std::env::temp_dir().join(format!("bazaar_draft_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, draft_json(r#"[{"date": "2024-01-01", "price": "28.5"}]"#))
            .await
            .unwrap();

        let draft = load_draft(&path).await.unwrap();
        assert_eq!(draft.item_name, "Potato");
        assert_eq!(draft.price_history[0].price, 28.5);

        tokio::fs::remove_file(&path).await.unwrap();
        assert!(load_draft(&path).await.is_err());
    }
}
