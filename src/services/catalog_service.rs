//! Catalog Service - book listing and lookup
//!
//! The API returns the whole catalog; search and category filtering happen
//! client-side.

use crate::domain::{ApiError, StorefrontApi};
use crate::models::{Book, BookCategory};

/// Filter parameters for listing books
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    /// Matched against title or author, case-insensitive
    pub search: Option<String>,
    /// `None` means all categories
    pub category: Option<BookCategory>,
}

/// List the catalog with optional filters
pub async fn list_books(api: &dyn StorefrontApi, filter: &BookFilter) -> Result<Vec<Book>, ApiError> {
    tracing::info!(
        "List books - Filters: search={:?}, category={:?}",
        filter.search,
        filter.category
    );

    let books = api.list_books().await?;
    let total = books.len();
    let books = filter_books(books, filter);
    tracing::debug!("{} of {} book(s) match", books.len(), total);
    Ok(books)
}

pub fn filter_books(books: Vec<Book>, filter: &BookFilter) -> Vec<Book> {
    books
        .into_iter()
        .filter(|book| {
            if let Some(term) = &filter.search
                && !term.trim().is_empty()
                && !book.matches_search(term.trim())
            {
                return false;
            }
            filter.category.is_none_or(|category| book.category == category)
        })
        .collect()
}

pub async fn get_book(api: &dyn StorefrontApi, id: &str) -> Result<Book, ApiError> {
    api.get_book(id).await
}
