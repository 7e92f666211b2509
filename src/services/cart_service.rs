//! Cart Service - persisted cart and its view-model operations
//!
//! The cart lives entirely in the `cart` slot. Every mutation is a
//! load-modify-save under a process-local lock followed by an announcement.

use std::sync::{Arc, Mutex, PoisonError};

use super::cart_events::CartNotifier;
use super::session::SessionContext;
use crate::domain::{CartError, KeyValueStore, StorageError, slots};
use crate::models::{Book, Cart, CartItem, FulfilmentMethod, Totals};

#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
    notifier: CartNotifier,
    write_lock: Arc<Mutex<()>>,
}

impl CartStore {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: CartNotifier) -> Self {
        Self {
            store,
            notifier,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn notifier(&self) -> &CartNotifier {
        &self.notifier
    }

    /// The persisted cart, or an empty one. Never fails.
    pub fn load(&self) -> Cart {
        let raw = match self.store.get(slots::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                tracing::error!("Failed to read cart slot: {}", e);
                return Cart::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Persisted cart is not a JSON array, ignoring it: {}", e);
                return Cart::new();
            }
        };

        let (cart, discarded) = Cart::from_entries(entries);
        if discarded > 0 {
            tracing::warn!("Discarded {} malformed cart entr(ies)", discarded);
        }
        cart
    }

    /// Replace the persisted cart. An empty cart removes the slot.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        if cart.is_empty() {
            return self.clear();
        }
        let json = serde_json::to_string(cart)?;
        self.store.set(slots::CART, &json)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(slots::CART)
    }

    /// Run one read-modify-write. `apply` returns whether anything changed;
    /// unchanged carts are neither saved nor announced.
    fn mutate<T, E>(&self, apply: impl FnOnce(&mut Cart) -> Result<(T, bool), E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cart = self.load();
        let (value, changed) = apply(&mut cart)?;
        if changed {
            self.save(&cart)?;
            self.notifier.announce();
        }
        Ok(value)
    }
}

/// Add `quantity` copies of `book`, merging with an existing entry.
///
/// The merged quantity may never exceed the book's current stock; an add
/// that would is rejected whole and the cart is left as it was.
pub fn add_to_cart(
    cart: &CartStore,
    session: &SessionContext,
    book: &Book,
    quantity: u32,
) -> Result<CartItem, CartError> {
    if !session.is_authenticated() {
        return Err(CartError::LoginRequired);
    }
    if session.is_admin() {
        return Err(CartError::AdminForbidden);
    }
    if quantity == 0 {
        return Err(CartError::InvalidQuantity);
    }

    let item = cart.mutate(|current| {
        let existing = current.find(&book.id).map_or(0, |item| item.quantity);
        let requested = existing.saturating_add(quantity);
        if requested > book.stock {
            return Err(CartError::InsufficientStock {
                available: book.stock,
                requested,
            });
        }
        Ok((current.merge(book, quantity).clone(), true))
    })?;

    tracing::info!(
        "Added {} x '{}' to cart (now {})",
        quantity,
        book.title,
        item.quantity
    );
    Ok(item)
}

/// Replace the quantity of an entry; zero or less removes it.
/// Unknown book ids are ignored.
pub fn update_quantity(cart: &CartStore, book_id: &str, quantity: i64) -> Result<(), StorageError> {
    if quantity <= 0 {
        remove_item(cart, book_id)?;
        return Ok(());
    }
    let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
    cart.mutate(|current| Ok::<_, StorageError>(((), current.set_quantity(book_id, quantity))))
}

/// Step an entry up by one, refusing to pass the stock of its book snapshot.
pub fn increment(cart: &CartStore, book_id: &str) -> Result<u32, CartError> {
    cart.mutate(|current| {
        let item = current
            .find(book_id)
            .ok_or_else(|| CartError::NotInCart(book_id.to_string()))?;
        if item.quantity >= item.book.stock {
            return Err(CartError::InsufficientStock {
                available: item.book.stock,
                requested: item.quantity.saturating_add(1),
            });
        }
        let next = item.quantity + 1;
        current.set_quantity(book_id, next);
        Ok((next, true))
    })
}

/// Step an entry down by one; reaching zero removes it.
pub fn decrement(cart: &CartStore, book_id: &str) -> Result<u32, CartError> {
    cart.mutate(|current| {
        let item = current
            .find(book_id)
            .ok_or_else(|| CartError::NotInCart(book_id.to_string()))?;
        let next = item.quantity - 1;
        current.set_quantity(book_id, next);
        Ok((next, true))
    })
}

/// Returns whether an entry was removed.
pub fn remove_item(cart: &CartStore, book_id: &str) -> Result<bool, StorageError> {
    cart.mutate(|current| {
        let removed = current.remove(book_id);
        Ok::<_, StorageError>((removed, removed))
    })
}

/// Empty the cart, but only once the user has confirmed.
/// Returns whether the cart was cleared.
pub fn clear_cart(cart: &CartStore, confirmed: bool) -> Result<bool, StorageError> {
    if !confirmed {
        tracing::debug!("Cart clear not confirmed, keeping cart");
        return Ok(false);
    }
    let _guard = cart
        .write_lock
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    cart.clear()?;
    cart.notifier.announce();
    tracing::info!("Cart cleared");
    Ok(true)
}

pub fn compute_totals(cart: &Cart, method: FulfilmentMethod, delivery_fee: f64) -> Totals {
    Totals::compute(cart, method, delivery_fee)
}

/// Badge count: total quantity in the persisted cart
pub fn badge_count(cart: &CartStore) -> u32 {
    cart.load().item_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;
    use crate::models::{AuthResponse, BookCategory, Role, User};

    fn book(id: &str, price: f64, stock: u32) -> Book {
        Book {
            id: id.to_string(),
            title: format!("Book {}", id),
            author: "Author".to_string(),
            price,
            stock,
            category: BookCategory::Manual,
            class_form_level: None,
            cover_image: None,
            created_at: None,
        }
    }

    fn signed_in(store: Arc<MemoryStore>, role: Role) -> SessionContext {
        let session = SessionContext::hydrate(store);
        session
            .establish(AuthResponse {
                token: "t0k3n".to_string(),
                user: User {
                    id: "u1".to_string(),
                    name: "Chidi".to_string(),
                    email: "chidi@futo.edu.ng".to_string(),
                    reg_number: "20191112223".to_string(),
                    role,
                    accommodation: None,
                    created_at: None,
                },
            })
            .unwrap();
        session
    }

    fn setup(role: Role) -> (Arc<MemoryStore>, CartStore, SessionContext) {
        let store = Arc::new(MemoryStore::new());
        let session = signed_in(store.clone(), role);
        let cart = CartStore::new(store.clone(), CartNotifier::new());
        (store, cart, session)
    }

    #[test]
    fn test_load_empty_when_absent_or_garbage() {
        let (store, cart, _) = setup(Role::Student);
        assert!(cart.load().is_empty());

        store.set(slots::CART, "{definitely not a cart").unwrap();
        assert!(cart.load().is_empty());

        store.set(slots::CART, r#"{"book": 1}"#).unwrap();
        assert!(cart.load().is_empty());
    }

    #[test]
    fn test_add_merges_repeated_book() {
        let (_, cart, session) = setup(Role::Student);
        let calculus = book("b1", 1000.0, 5);

        add_to_cart(&cart, &session, &calculus, 1).unwrap();
        let item = add_to_cart(&cart, &session, &calculus, 2).unwrap();

        assert_eq!(item.quantity, 3);
        let loaded = cart.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.find("b1").unwrap().quantity, 3);
    }

    #[test]
    fn test_add_beyond_stock_rejected_without_truncation() {
        let (_, cart, session) = setup(Role::Student);
        let scarce = book("b1", 1000.0, 2);

        add_to_cart(&cart, &session, &scarce, 1).unwrap();
        let err = add_to_cart(&cart, &session, &scarce, 2).unwrap_err();

        assert!(matches!(
            err,
            CartError::InsufficientStock {
                available: 2,
                requested: 3
            }
        ));
        assert_eq!(cart.load().find("b1").unwrap().quantity, 1);

        // Filling up to exactly the stock is allowed
        add_to_cart(&cart, &session, &scarce, 1).unwrap();
        assert_eq!(cart.load().find("b1").unwrap().quantity, 2);
    }

    #[test]
    fn test_add_out_of_stock_and_zero_quantity() {
        let (_, cart, session) = setup(Role::Student);

        let err = add_to_cart(&cart, &session, &book("b1", 10.0, 0), 1).unwrap_err();
        assert_eq!(err.user_message(), "This book is out of stock");

        let err = add_to_cart(&cart, &session, &book("b2", 10.0, 3), 0).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity));
        assert!(cart.load().is_empty());
    }

    #[test]
    fn test_admin_and_anonymous_cannot_add() {
        let (_, cart, admin) = setup(Role::Admin);
        let err = add_to_cart(&cart, &admin, &book("b1", 10.0, 3), 1).unwrap_err();
        assert!(matches!(err, CartError::AdminForbidden));

        let anonymous = SessionContext::hydrate(Arc::new(MemoryStore::new()));
        let err = add_to_cart(&cart, &anonymous, &book("b1", 10.0, 3), 1).unwrap_err();
        assert!(matches!(err, CartError::LoginRequired));
        assert_eq!(err.redirect(), Some(crate::domain::Navigation::Login));

        assert!(cart.load().is_empty());
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let (store, cart, session) = setup(Role::Student);
        add_to_cart(&cart, &session, &book("b1", 10.0, 9), 3).unwrap();
        add_to_cart(&cart, &session, &book("b2", 10.0, 9), 1).unwrap();

        update_quantity(&cart, "b1", 7).unwrap();
        assert_eq!(cart.load().find("b1").unwrap().quantity, 7);

        update_quantity(&cart, "b1", -2).unwrap();
        assert!(cart.load().find("b1").is_none());

        update_quantity(&cart, "b2", 0).unwrap();
        assert!(cart.load().is_empty());
        assert!(store.get(slots::CART).unwrap().is_none());

        // Unknown id is a no-op
        update_quantity(&cart, "nope", 4).unwrap();
        assert!(cart.load().is_empty());
    }

    #[test]
    fn test_increment_capped_at_stock_and_decrement_removes() {
        let (_, cart, session) = setup(Role::Student);
        add_to_cart(&cart, &session, &book("b1", 10.0, 2), 1).unwrap();

        assert_eq!(increment(&cart, "b1").unwrap(), 2);
        assert!(matches!(
            increment(&cart, "b1"),
            Err(CartError::InsufficientStock { .. })
        ));

        assert_eq!(decrement(&cart, "b1").unwrap(), 1);
        assert_eq!(decrement(&cart, "b1").unwrap(), 0);
        assert!(cart.load().is_empty());
        assert!(matches!(
            decrement(&cart, "b1"),
            Err(CartError::NotInCart(_))
        ));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let (_, cart, session) = setup(Role::Student);
        add_to_cart(&cart, &session, &book("b1", 10.0, 2), 1).unwrap();

        assert!(!clear_cart(&cart, false).unwrap());
        assert_eq!(badge_count(&cart), 1);

        assert!(clear_cart(&cart, true).unwrap());
        assert_eq!(badge_count(&cart), 0);
    }

    #[test]
    fn test_mutations_announce() {
        let (_, cart, session) = setup(Role::Student);
        let mut events = cart.notifier().subscribe();

        add_to_cart(&cart, &session, &book("b1", 10.0, 2), 1).unwrap();
        assert!(events.try_recv().is_ok());

        remove_item(&cart, "b1").unwrap();
        assert!(events.try_recv().is_ok());

        // Nothing removed, nothing announced
        remove_item(&cart, "b1").unwrap();
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_random_operation_sequences_keep_invariants() {
        let (_, cart, session) = setup(Role::Student);
        let books = [book("a", 100.0, 3), book("b", 50.0, 5), book("c", 20.0, 1)];

        // Deterministic pseudo-random walk over the operations
        let mut seed: u64 = 0x5eed;
        for _ in 0..300 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let pick = &books[(seed >> 33) as usize % books.len()];
            match (seed >> 40) % 4 {
                0 => {
                    let _ = add_to_cart(&cart, &session, pick, ((seed >> 50) % 3) as u32);
                }
                1 => update_quantity(&cart, &pick.id, ((seed >> 48) % 7) as i64 - 2).unwrap(),
                2 => {
                    remove_item(&cart, &pick.id).unwrap();
                }
                _ => {
                    let _ = increment(&cart, &pick.id);
                }
            }

            let loaded = cart.load();
            let mut ids: Vec<&str> = loaded.items().iter().map(|i| i.book.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), loaded.len(), "duplicate book id in cart");
            assert!(loaded.items().iter().all(|i| i.quantity > 0), "zero quantity stored");
        }
    }

    #[test]
    fn test_compute_totals_matches_model() {
        let (_, cart, session) = setup(Role::Student);
        add_to_cart(&cart, &session, &book("a", 1000.0, 5), 2).unwrap();
        add_to_cart(&cart, &session, &book("b", 500.0, 5), 1).unwrap();

        let totals = compute_totals(&cart.load(), FulfilmentMethod::Delivery, 500.0);
        assert_eq!(totals.items_total, 2500.0);
        assert_eq!(totals.grand_total, 3000.0);
    }
}
