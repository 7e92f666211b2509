use std::fmt;

/// Where the front-end should go after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Login,
    Dashboard,
    AdminPanel,
    Books,
    Cart,
    Orders,
    /// Payment page of a freshly created order
    Payment(String),
    /// Externally hosted page, e.g. the cashier
    External(String),
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Navigation::Login => f.write_str("/login"),
            Navigation::Dashboard => f.write_str("/dashboard"),
            Navigation::AdminPanel => f.write_str("/admin"),
            Navigation::Books => f.write_str("/books"),
            Navigation::Cart => f.write_str("/cart"),
            Navigation::Orders => f.write_str("/orders"),
            Navigation::Payment(order_id) => write!(f, "/orders/{}/payment", order_id),
            Navigation::External(url) => f.write_str(url),
        }
    }
}
