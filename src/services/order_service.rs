use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cache::{Mutation, QueryKey};
use crate::context::AppContext;
use crate::models::order::to_minor_units;
use crate::models::{
    NewOrder, Order, PaymentIntent, PaymentIntentRequest, Product, PurchaseResult, Role,
};
use crate::services::product_service;
use crate::session::Session;
use crate::utils::AppError;

/// Buy one unit of a product at its listed price
///
/// With a payment method the processor can settle the intent straight away, and
/// the order is recorded. Otherwise the client secret is handed back so the
/// payment can be confirmed with the processor and recorded with [`confirm`].
pub async fn buy(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
    payment_method_id: Option<&str>,
) -> Result<PurchaseResult, AppError> {
    let product = product_service::get_product(ctx, session, product_id).await?;
    let request = payment_request(&product, payment_method_id)?;

    let api = ctx.api_for(session);
    let intent = api.create_payment_intent(&request).await?;

    let (result, order) = settle(session, &product, &intent, Utc::now());
    let Some(order) = order else {
        warn!(
            "Payment {} for {} is {:?}, order not placed yet",
            result.transaction_id, product.id, intent.status
        );
        return Ok(result);
    };

    api.create_order(&order).await?;
    ctx.cache.invalidate(&Mutation::CreateOrder).await;
    info!("{} bought {} ({})", session.email, order.product_id, order.transaction_id);
    Ok(result)
}

/// Record the order for a payment confirmed with the processor after `buy`
pub async fn confirm(
    ctx: &AppContext,
    session: &Session,
    product_id: &str,
    transaction_id: &str,
) -> Result<PurchaseResult, AppError> {
    validate_transaction_id(transaction_id)?;

    let existing = my_orders(ctx, session).await?;
    if existing.iter().any(|order| order.transaction_id == transaction_id) {
        return Err(AppError::InvalidInput(format!(
            "An order for transaction {} is already recorded",
            transaction_id
        )));
    }

    let product = product_service::get_product(ctx, session, product_id).await?;
    let order = new_order(session, &product, transaction_id, Utc::now());

    ctx.api_for(session).create_order(&order).await?;
    ctx.cache.invalidate(&Mutation::CreateOrder).await;
    info!("{} confirmed {} ({})", session.email, order.product_id, transaction_id);

    Ok(PurchaseResult {
        product_name: order.product_name,
        amount: order.price,
        transaction_id: order.transaction_id,
        order_placed: true,
        client_secret: None,
    })
}

fn payment_request(
    product: &Product,
    payment_method_id: Option<&str>,
) -> Result<PaymentIntentRequest, AppError> {
    if product.price_per_unit <= 0.0 {
        return Err(AppError::InvalidInput(format!(
            "{} has no price to pay",
            product.item_name
        )));
    }

    Ok(PaymentIntentRequest {
        amount: to_minor_units(product.price_per_unit),
        product_id: product.id.clone(),
        payment_method_id: payment_method_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
    })
}

/// Outcome of a payment intent, with the order to record when it succeeded
fn settle(
    session: &Session,
    product: &Product,
    intent: &PaymentIntent,
    now: DateTime<Utc>,
) -> (PurchaseResult, Option<NewOrder>) {
    let transaction_id = intent.transaction_id();
    let succeeded = intent.is_succeeded();

    let result = PurchaseResult {
        product_name: product.item_name.clone(),
        amount: product.price_per_unit,
        transaction_id: transaction_id.clone(),
        order_placed: succeeded,
        client_secret: (!succeeded).then(|| intent.client_secret.clone()),
    };
    let order = succeeded.then(|| new_order(session, product, &transaction_id, now));

    (result, order)
}

fn new_order(
    session: &Session,
    product: &Product,
    transaction_id: &str,
    date: DateTime<Utc>,
) -> NewOrder {
    NewOrder {
        product_id: product.id.clone(),
        product_name: product.item_name.clone(),
        market_name: product.market_name.clone(),
        transaction_id: transaction_id.to_string(),
        price: product.price_per_unit,
        buyer_name: session.display_name.clone(),
        buyer_email: session.email.clone(),
        date,
    }
}

fn validate_transaction_id(transaction_id: &str) -> Result<(), AppError> {
    let valid = !transaction_id.is_empty()
        && transaction_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "'{}' is not a valid transaction id",
            transaction_id
        )))
    }
}

pub async fn my_orders(ctx: &AppContext, session: &Session) -> Result<Vec<Order>, AppError> {
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::MyOrders(session.email.clone()), || async move {
            api.my_orders(&session.email).await.map_err(AppError::from)
        })
        .await
}

pub async fn all_orders(ctx: &AppContext, session: &Session) -> Result<Vec<Order>, AppError> {
    session.require_role(Role::Admin)?;
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::AllOrders, || async move {
            api.all_orders().await.map_err(AppError::from)
        })
        .await
}

/// Sum of order prices
pub fn total_spent(orders: &[Order]) -> f64 {
    orders.iter().map(|order| order.price).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyer() -> Session {
        Session {
            email: "buyer@example.com".to_string(),
            display_name: "Nusrat".to_string(),
            access_token: "t".to_string(),
            role: Role::User,
        }
    }

    fn onion() -> Product {
        serde_json::from_str(
            r#"{"_id": "p1", "itemName": "Onion", "marketName": "Kawran Bazar", "pricePerUnit": "45.5"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_payment_request_carries_method() {
        let request = payment_request(&onion(), Some(" pm_card_visa ")).unwrap();
        assert_eq!(request.amount, 4550);
        assert_eq!(request.payment_method_id.as_deref(), Some("pm_card_visa"));

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["paymentMethodId"], "pm_card_visa");
        assert_eq!(body["productId"], "p1");

        let request = payment_request(&onion(), None).unwrap();
        assert!(request.payment_method_id.is_none());
        assert!(serde_json::to_value(&request).unwrap().get("paymentMethodId").is_none());
    }

    #[test]
    fn test_unpriced_product_cannot_be_bought() {
        let free = Product { price_per_unit: 0.0, ..onion() };
        assert!(matches!(payment_request(&free, None), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_succeeded_intent_places_order() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{"clientSecret": "pi_9_secret_x", "id": "pi_9", "status": "succeeded"}"#,
        )
        .unwrap();
        let now = Utc::now();

        let (result, order) = settle(&buyer(), &onion(), &intent, now);
        assert!(result.order_placed);
        assert_eq!(result.transaction_id, "pi_9");
        assert!(result.client_secret.is_none());

        let order = order.unwrap();
        assert_eq!(order.transaction_id, "pi_9");
        assert_eq!(order.price, 45.5);
        assert_eq!(order.buyer_email, "buyer@example.com");
        assert_eq!(order.date, now);
    }

    #[test]
    fn test_pending_intent_returns_secret() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{"clientSecret": "pi_7_secret_y", "status": "requires_confirmation"}"#,
        )
        .unwrap();

        let (result, order) = settle(&buyer(), &onion(), &intent, Utc::now());
        assert!(!result.order_placed);
        assert!(order.is_none());
        assert_eq!(result.transaction_id, "pi_7");
        assert_eq!(result.client_secret.as_deref(), Some("pi_7_secret_y"));
    }

    #[test]
    fn test_validate_transaction_id() {
        assert!(validate_transaction_id("pi_3MtwBwLkdIwHu7ix28a3tqPa").is_ok());
        assert!(validate_transaction_id("").is_err());
        assert!(validate_transaction_id("pi 1").is_err());
        assert!(validate_transaction_id("pi_1_secret_x/..").is_err());
    }

    #[test]
    fn test_total_spent() {
        let orders: Vec<Order> = serde_json::from_str(
            r#"[
                {"_id": "o1", "productId": "p1", "price": 45},
                {"_id": "o2", "productId": "p2", "price": "12.5"}
            ]"#,
        )
        .unwrap();
        assert_eq!(total_spent(&orders), 57.5);
        assert_eq!(total_spent(&[]), 0.0);
    }
}
