// Command Line Interface Module
// One subcommand per storefront operation

mod admin;
mod cart;
pub mod output;

use clap::{Parser, Subcommand};

use bookmate::AppState;
use bookmate::domain::Navigation;
use bookmate::models::{BookCategory, FulfilmentMethod, RegisterRequest};
use bookmate::services::{
    BookFilter, CheckoutForm, CheckoutOutcome, PaymentRedirect, PaymentView, auth_service,
    catalog_service, order_service,
};

use output::Failure;

/// Bookmate - campus book ordering from the terminal
#[derive(Parser)]
#[command(name = "bookmate")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Profile name; each profile keeps its own session and cart
    #[arg(long, global = true, env = "PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with an email address or registration number
    Login {
        email_or_reg_number: String,
        #[arg(short, long, env = "BOOKMATE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a student account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        reg_number: String,
        #[arg(short, long, env = "BOOKMATE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Eziobodo, Umuchima, ...
        #[arg(long)]
        accommodation: String,
    },
    /// Sign out on this device
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse the catalog
    Books {
        /// Match title or author
        #[arg(short, long)]
        search: Option<String>,
        /// Textbook, Manual, Guide or "Past Paper"
        #[arg(short, long)]
        category: Option<BookCategory>,
    },
    /// Show one book
    Book { id: String },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        command: cart::CartCommand,
    },
    /// Place an order for everything in the cart
    Checkout {
        #[arg(short, long, default_value = "pickup")]
        method: FulfilmentMethod,
        /// Delivery address (delivery only)
        #[arg(short, long, default_value = "")]
        address: String,
        /// Contact phone number
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Pay for an order through the cashier page
    Pay { order_id: String },
    /// Look up a payment by its reference
    PaymentStatus { reference: String },
    /// List your orders
    Orders,
    /// Show one order
    Order { id: String },
    /// Cancel one of your orders
    CancelOrder { id: String },
    /// Admin operations
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommand,
    },
}

pub async fn run(command: Commands, state: &AppState) -> Result<(), Failure> {
    let api = state.api.as_ref();
    let session = state.session.as_ref();

    match command {
        Commands::Login {
            email_or_reg_number,
            password,
        } => {
            let user = auth_service::login(api, session, &email_or_reg_number, &password).await?;
            println!("Welcome back, {}", user.name);
            output::navigate(&home(user.is_admin()));
        }
        Commands::Register {
            name,
            email,
            reg_number,
            password,
            accommodation,
        } => {
            let request = RegisterRequest {
                name,
                email,
                reg_number,
                password,
                accommodation,
            };
            let user = auth_service::register(api, session, request).await?;
            println!("Account created for {}", user.name);
            output::navigate(&home(user.is_admin()));
        }
        Commands::Logout => {
            session.logout();
            println!("Signed out");
            output::navigate(&Navigation::Login);
        }
        Commands::Whoami => match session.user() {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                println!("  reg number: {}", user.reg_number);
                println!("  role:       {}", user.role);
                if let Some(accommodation) = &user.accommodation {
                    println!("  lodge:      {}", accommodation);
                }
            }
            None => return Err(Failure::new("Not signed in")),
        },
        Commands::Books { search, category } => {
            let filter = BookFilter { search, category };
            let books = catalog_service::list_books(api, &filter)
                .await
                .map_err(|e| Failure::api(e, "Failed to load books"))?;
            if books.is_empty() {
                println!("No books found");
            }
            for book in &books {
                output::book_line(book);
            }
        }
        Commands::Book { id } => {
            let book = catalog_service::get_book(api, &id)
                .await
                .map_err(|e| Failure::api(e, "Failed to load book"))?;
            output::book_detail(&book);
        }
        Commands::Cart { command } => cart::run(command, state).await?,
        Commands::Checkout {
            method,
            address,
            phone,
        } => {
            let form = CheckoutForm {
                method,
                delivery_address: address,
                phone_number: phone,
            };
            match state.checkout.submit(&form).await? {
                CheckoutOutcome::Placed { order, next } => {
                    println!("Order placed successfully!");
                    output::order_detail(&order);
                    output::navigate(&next);
                }
                CheckoutOutcome::AlreadySubmitting => println!("Placing order..."),
            }
        }
        Commands::Pay { order_id } => match state.payment.load_order(&order_id).await? {
            PaymentView::AlreadyPaid(order) => {
                println!("This order has already been paid.");
                output::order_line(&order);
            }
            PaymentView::AwaitingPayment(order) => {
                output::order_detail(&order);
                match state.payment.initiate_payment(&order.id).await? {
                    PaymentRedirect::Navigate(url) => {
                        println!("Continue to the cashier to complete payment:");
                        output::navigate(&Navigation::External(url));
                    }
                    PaymentRedirect::AlreadyPending => println!("Processing..."),
                }
            }
        },
        Commands::PaymentStatus { reference } => {
            let report = state.payment.payment_status(&reference).await?;
            println!(
                "{}: {}",
                report.reference.as_deref().unwrap_or(&reference),
                report.status
            );
            if let Some(order_id) = &report.order_id {
                println!("  order: {}", order_id);
            }
        }
        Commands::Orders => {
            let orders = order_service::list_orders(api, session).await?;
            if orders.is_empty() {
                println!("You have no orders yet");
            }
            for order in &orders {
                output::order_line(order);
            }
        }
        Commands::Order { id } => {
            let order = order_service::get_order(api, session, &id).await?;
            output::order_detail(&order);
        }
        Commands::CancelOrder { id } => {
            let order = order_service::cancel_order(api, session, &id).await?;
            println!("Order cancelled");
            output::order_line(&order);
        }
        Commands::Admin { command } => admin::run(command, state).await?,
    }
    Ok(())
}

fn home(is_admin: bool) -> Navigation {
    if is_admin {
        Navigation::AdminPanel
    } else {
        Navigation::Dashboard
    }
}
