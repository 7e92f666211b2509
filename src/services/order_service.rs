//! Order Service - the signed-in student's orders

use chrono::{DateTime, Utc};

use super::session::SessionContext;
use crate::domain::{OrderError, StorefrontApi};
use crate::models::Order;

/// Own orders, newest first. Orders without a readable date sort last.
pub async fn list_orders(
    api: &dyn StorefrontApi,
    session: &SessionContext,
) -> Result<Vec<Order>, OrderError> {
    if !session.is_authenticated() {
        return Err(OrderError::LoginRequired);
    }

    let mut orders = api.list_orders().await.map_err(OrderError::Load)?;
    sort_newest_first(&mut orders);
    tracing::debug!("Loaded {} order(s)", orders.len());
    Ok(orders)
}

pub async fn get_order(
    api: &dyn StorefrontApi,
    session: &SessionContext,
    id: &str,
) -> Result<Order, OrderError> {
    if !session.is_authenticated() {
        return Err(OrderError::LoginRequired);
    }
    api.get_order(id).await.map_err(OrderError::Load)
}

pub async fn cancel_order(
    api: &dyn StorefrontApi,
    session: &SessionContext,
    id: &str,
) -> Result<Order, OrderError> {
    if !session.is_authenticated() {
        return Err(OrderError::LoginRequired);
    }

    let order = api.cancel_order(id).await.map_err(OrderError::Cancel)?;
    tracing::info!("Order {} cancelled", order.id);
    Ok(order)
}

pub(crate) fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by_key(|order| {
        std::cmp::Reverse(order.created_at_utc().unwrap_or(DateTime::<Utc>::MIN_UTC))
    });
}
