use clap::Subcommand;

use bookmate::AppState;
use bookmate::models::FulfilmentMethod;
use bookmate::services::{cart_service, catalog_service, spawn_badge};

use super::output::{self, Failure};

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show cart contents and totals
    Show {
        #[arg(short, long, default_value = "pickup")]
        method: FulfilmentMethod,
    },
    /// Add a book to the cart
    Add {
        book_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a cart entry (0 or less removes it)
    Set {
        book_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Increase a cart entry by one, up to the stock available
    Inc { book_id: String },
    /// Decrease a cart entry by one
    Dec { book_id: String },
    /// Remove a book from the cart
    Remove { book_id: String },
    /// Empty the cart
    Clear {
        /// Confirm clearing
        #[arg(long)]
        yes: bool,
    },
    /// Print the item count whenever the cart changes, until interrupted
    Watch,
}

pub async fn run(command: CartCommand, state: &AppState) -> Result<(), Failure> {
    match command {
        CartCommand::Show { method } => {
            let cart = state.cart.load();
            let totals = state.checkout.totals(method);
            output::cart(&cart, &totals);
            if method == FulfilmentMethod::Pickup && !cart.is_empty() {
                println!("Pickup at {}", state.config.pickup_station);
            }
        }
        CartCommand::Add { book_id, quantity } => {
            let book = catalog_service::get_book(state.api.as_ref(), &book_id)
                .await
                .map_err(|e| Failure::api(e, "Failed to load book"))?;
            let item = cart_service::add_to_cart(&state.cart, &state.session, &book, quantity)?;
            println!("Added to cart: {} (x{})", item.book.title, item.quantity);
            println!("Cart items: {}", cart_service::badge_count(&state.cart));
        }
        CartCommand::Set { book_id, quantity } => {
            cart_service::update_quantity(&state.cart, &book_id, quantity)?;
            println!("Cart items: {}", cart_service::badge_count(&state.cart));
        }
        CartCommand::Inc { book_id } => {
            let quantity = cart_service::increment(&state.cart, &book_id)?;
            println!("Quantity now {}", quantity);
        }
        CartCommand::Dec { book_id } => {
            let quantity = cart_service::decrement(&state.cart, &book_id)?;
            if quantity == 0 {
                println!("Removed from cart");
            } else {
                println!("Quantity now {}", quantity);
            }
        }
        CartCommand::Remove { book_id } => {
            if cart_service::remove_item(&state.cart, &book_id)? {
                println!("Removed from cart");
            } else {
                println!("That book is not in your cart");
            }
        }
        CartCommand::Clear { yes } => {
            if cart_service::clear_cart(&state.cart, yes)? {
                println!("Cart cleared");
            } else {
                return Err(Failure::new(
                    "Are you sure you want to clear your cart? Re-run with --yes to confirm.",
                ));
            }
        }
        CartCommand::Watch => watch(state).await,
    }
    Ok(())
}

async fn watch(state: &AppState) {
    let (mut badge, task) = spawn_badge(state.cart_watcher());
    println!("Cart items: {}", *badge.borrow());

    loop {
        tokio::select! {
            changed = badge.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("Cart items: {}", *badge.borrow_and_update());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    task.abort();
}
