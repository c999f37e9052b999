use crate::commands::usage;
use crate::context::AppContext;
use crate::models::{Order, PurchaseResult};
use crate::services::order_service;
use crate::session::{require_login, Session};
use crate::utils::{format_price, AppError, Page, Table};

/// `buy <productId> [paymentMethodId]` or `buy confirm <productId> <transactionId>`
pub async fn buy(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    tracing::info!("💳 Buy command called with args: {:?}", args);

    let session = require_login(session)?;
    let purchase = match args {
        [confirm, product_id, transaction_id] if confirm.eq_ignore_ascii_case("confirm") => {
            order_service::confirm(ctx, session, product_id, transaction_id).await?
        }
        [product_id] => order_service::buy(ctx, session, product_id, None).await?,
        [product_id, payment_method_id] => {
            order_service::buy(ctx, session, product_id, Some(*payment_method_id)).await?
        }
        _ => {
            return Err(usage(
                "buy <productId> [paymentMethodId] | buy confirm <productId> <transactionId>",
            ))
        }
    };

    let product_id = if purchase.order_placed { "" } else { args[0] };
    Ok(purchase_message(&purchase, product_id))
}

fn purchase_message(purchase: &PurchaseResult, product_id: &str) -> String {
    if purchase.order_placed {
        return format!(
            "✅ Paid {} for {}\nTransaction: {}\nYour order has been placed.",
            format_price(purchase.amount),
            purchase.product_name,
            purchase.transaction_id
        );
    }

    let mut out = format!(
        "⏳ Payment of {} for {} needs confirmation. No order has been placed yet.\nTransaction: {}",
        format_price(purchase.amount),
        purchase.product_name,
        purchase.transaction_id
    );
    if let Some(secret) = &purchase.client_secret {
        out.push_str(&format!("\nClient secret: {}", secret));
    }
    out.push_str(&format!(
        "\nConfirm it with the payment processor, then record the order with \
         `buy confirm {} {}`.",
        product_id, purchase.transaction_id
    ));
    out
}

/// `orders [page]` or `orders all [page]`
pub async fn list(
    ctx: &AppContext,
    session: Option<&Session>,
    args: &[&str],
) -> Result<String, AppError> {
    let session = require_login(session)?;

    let (all, page_arg) = match args.first() {
        Some(first) if first.eq_ignore_ascii_case("all") => (true, args.get(1)),
        _ => (false, args.first()),
    };
    let page_num = match page_arg {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid page number '{}'", raw)))?,
        None => 1,
    };

    let orders = if all {
        order_service::all_orders(ctx, session).await?
    } else {
        order_service::my_orders(ctx, session).await?
    };

    if orders.is_empty() {
        return Ok("📭 No orders yet.".to_string());
    }

    let page = Page::of(&orders, page_num, ctx.config.page_size as usize)?;
    let next = if all { "orders all" } else { "orders" };
    Ok(format!(
        "🧾 {}\n{}\n{}\nTotal: {}",
        if all { "All orders" } else { "Your orders" },
        order_table(page.items, all),
        page.footer(next),
        format_price(order_service::total_spent(&orders))
    ))
}

fn order_table(orders: &[Order], with_buyer: bool) -> String {
    let mut headers = vec!["Date", "Item", "Market", "Price", "Transaction"];
    if with_buyer {
        headers.push("Buyer");
    }
    let mut table = Table::new(&headers).align_right(&[3]);

    for order in orders {
        let mut row = vec![
            order
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            order.product_name.clone(),
            order.market_name.clone(),
            format_price(order.price),
            order.transaction_id.clone(),
        ];
        if with_buyer {
            row.push(order.buyer_email.clone());
        }
        table.add_row(row);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(order_placed: bool, client_secret: Option<&str>) -> PurchaseResult {
        PurchaseResult {
            product_name: "Onion".to_string(),
            amount: 45.5,
            transaction_id: "pi_123".to_string(),
            order_placed,
            client_secret: client_secret.map(str::to_string),
        }
    }

    #[test]
    fn test_placed_purchase_message() {
        let message = purchase_message(&purchase(true, None), "");
        assert!(message.contains("Your order has been placed"));
        assert!(message.contains("pi_123"));
        assert!(!message.contains("buy confirm"));
    }

    #[test]
    fn test_pending_purchase_message() {
        let message = purchase_message(&purchase(false, Some("pi_123_secret")), "p1");
        assert!(message.contains("Client secret: pi_123_secret"));
        assert!(message.contains("`buy confirm p1 pi_123`"));
        assert!(!message.contains("has been placed."));

        // Without a secret the order is still reported as pending
        let message = purchase_message(&purchase(false, None), "p1");
        assert!(message.contains("No order has been placed yet"));
        assert!(!message.contains("Client secret"));
    }
}
