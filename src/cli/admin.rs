use clap::{Args, Subcommand};
use std::path::PathBuf;

use bookmate::AppState;
use bookmate::models::{BookCategory, BookForm, CoverUpload, OrderStatus};
use bookmate::services::admin_service;

use super::output::{self, Failure};

const LOW_STOCK: u32 = 5;

#[derive(Subcommand)]
pub enum AdminCommand {
    /// All orders and the catalog
    Dashboard,
    /// Move an order to a new status
    SetStatus {
        order_id: String,
        /// processing, purchased, delivering or delivered
        status: OrderStatus,
    },
    /// Add a book to the catalog
    CreateBook(BookArgs),
    /// Replace a book's details
    UpdateBook {
        id: String,
        #[command(flatten)]
        book: BookArgs,
    },
    /// Remove a book from the catalog
    DeleteBook {
        id: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct BookArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    #[arg(long)]
    price: f64,
    /// Textbook, Manual, Guide or "Past Paper"
    #[arg(long)]
    category: Option<BookCategory>,
    /// Class or form level, e.g. "100 Level"
    #[arg(long)]
    level: Option<String>,
    #[arg(long, default_value_t = 0)]
    stock: u32,
    /// Cover image file
    #[arg(long)]
    cover: Option<PathBuf>,
}

impl BookArgs {
    fn into_form(self) -> Result<BookForm, Failure> {
        let cover = match self.cover {
            Some(path) => {
                let bytes = std::fs::read(&path).map_err(|e| {
                    Failure::new(format!("Could not read cover image {:?}: {}", path, e))
                })?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "cover.jpg".to_string());
                Some(CoverUpload::from_file_name(file_name, bytes))
            }
            None => None,
        };

        Ok(BookForm {
            title: self.title,
            author: self.author,
            price: self.price,
            category: self.category,
            class_form_level: self.level.filter(|level| !level.trim().is_empty()),
            stock: self.stock,
            cover,
        })
    }
}

pub async fn run(command: AdminCommand, state: &AppState) -> Result<(), Failure> {
    let api = state.api.as_ref();
    let session = state.session.as_ref();

    match command {
        AdminCommand::Dashboard => {
            let dashboard = admin_service::dashboard(api, session).await?;
            println!("Orders ({})", dashboard.orders.len());
            for status in OrderStatus::ALL {
                println!(
                    "  {:<11} {}",
                    status.to_string(),
                    dashboard.count_with_status(status)
                );
            }
            for order in &dashboard.orders {
                output::order_line(order);
            }
            println!();
            println!("Books ({})", dashboard.books.len());
            for book in &dashboard.books {
                output::book_line(book);
            }
            let low: Vec<_> = dashboard.low_stock(LOW_STOCK).collect();
            if !low.is_empty() {
                println!();
                println!("Low stock (<= {})", LOW_STOCK);
                for book in low {
                    println!("  {} ({} left)", book.title, book.stock);
                }
            }
        }
        AdminCommand::SetStatus { order_id, status } => {
            let order = admin_service::update_order_status(api, session, &order_id, status).await?;
            println!("Order status updated");
            output::order_line(&order);
        }
        AdminCommand::CreateBook(args) => {
            let book = admin_service::create_book(api, session, &args.into_form()?).await?;
            println!("Book created");
            output::book_detail(&book);
        }
        AdminCommand::UpdateBook { id, book } => {
            let book = admin_service::update_book(api, session, &id, &book.into_form()?).await?;
            println!("Book updated");
            output::book_detail(&book);
        }
        AdminCommand::DeleteBook { id, yes } => {
            if !yes {
                return Err(Failure::new(
                    "Are you sure you want to delete this book? Re-run with --yes to confirm.",
                ));
            }
            admin_service::delete_book(api, session, &id).await?;
            println!("Book deleted");
        }
    }
    Ok(())
}
