//! Admin Service - order status management and catalog maintenance
//!
//! Every operation checks the admin role before contacting the server.

use super::order_service::sort_newest_first;
use super::session::SessionContext;
use crate::domain::{AdminError, StorefrontApi};
use crate::models::{Book, BookForm, Order, OrderStatus};

/// Everything the admin panel shows on load
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub orders: Vec<Order>,
    pub books: Vec<Book>,
}

impl AdminDashboard {
    pub fn count_with_status(&self, status: OrderStatus) -> usize {
        self.orders
            .iter()
            .filter(|order| order.order_status == status)
            .count()
    }

    pub fn low_stock(&self, threshold: u32) -> impl Iterator<Item = &Book> {
        self.books.iter().filter(move |book| book.stock <= threshold)
    }
}

fn require_admin(session: &SessionContext) -> Result<(), AdminError> {
    if session.is_admin() {
        Ok(())
    } else {
        tracing::warn!("Admin operation refused for non-admin session");
        Err(AdminError::Forbidden)
    }
}

/// All orders and the full catalog, fetched concurrently.
pub async fn dashboard(
    api: &dyn StorefrontApi,
    session: &SessionContext,
) -> Result<AdminDashboard, AdminError> {
    require_admin(session)?;

    let (mut orders, books) = futures::try_join!(api.list_all_orders(), api.list_books())
        .map_err(AdminError::Load)?;
    sort_newest_first(&mut orders);

    tracing::info!(
        "Admin dashboard loaded: {} order(s), {} book(s)",
        orders.len(),
        books.len()
    );
    Ok(AdminDashboard { orders, books })
}

pub async fn update_order_status(
    api: &dyn StorefrontApi,
    session: &SessionContext,
    order_id: &str,
    status: OrderStatus,
) -> Result<Order, AdminError> {
    require_admin(session)?;

    let order = api
        .update_order_status(order_id, status)
        .await
        .map_err(AdminError::UpdateStatus)?;
    tracing::info!("Order {} status set to {}", order.id, order.order_status);
    Ok(order)
}

pub async fn create_book(
    api: &dyn StorefrontApi,
    session: &SessionContext,
    form: &BookForm,
) -> Result<Book, AdminError> {
    require_admin(session)?;
    form.validate().map_err(AdminError::InvalidForm)?;

    let book = api.create_book(form).await.map_err(AdminError::SaveBook)?;
    tracing::info!("Book created: {} ({})", book.title, book.id);
    Ok(book)
}

pub async fn update_book(
    api: &dyn StorefrontApi,
    session: &SessionContext,
    id: &str,
    form: &BookForm,
) -> Result<Book, AdminError> {
    require_admin(session)?;
    form.validate().map_err(AdminError::InvalidForm)?;

    let book = api
        .update_book(id, form)
        .await
        .map_err(AdminError::SaveBook)?;
    tracing::info!("Book updated: {} ({})", book.title, book.id);
    Ok(book)
}

pub async fn delete_book(
    api: &dyn StorefrontApi,
    session: &SessionContext,
    id: &str,
) -> Result<(), AdminError> {
    require_admin(session)?;

    api.delete_book(id).await.map_err(AdminError::DeleteBook)?;
    tracing::info!("Book deleted: {}", id);
    Ok(())
}
