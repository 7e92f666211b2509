//! Checkout Service - order submission state machine
//!
//! `Idle -> Validating -> Submitting -> Succeeded | Failed`. Entry checks
//! (empty cart, signed out, admin) reject before Validating and send nothing.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

use super::cart_service::{self, CartStore};
use super::in_flight::InFlight;
use super::session::SessionContext;
use crate::config::Config;
use crate::domain::{CheckoutError, Navigation, StorefrontApi, ValidationError};
use crate::models::{FulfilmentMethod, NewOrder, Order, Totals};

pub const MIN_ADDRESS_CHARS: usize = 10;
pub const MIN_PHONE_CHARS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub method: FulfilmentMethod,
    /// Only read for delivery
    pub delivery_address: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Idle,
    Validating,
    Submitting,
    Succeeded { order_id: String },
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub delivery_fee: f64,
    pub pickup_station: String,
    /// Capture a contact phone and prefix it to the address
    pub require_phone: bool,
}

impl From<&Config> for CheckoutSettings {
    fn from(config: &Config) -> Self {
        Self {
            delivery_fee: config.delivery_fee,
            pickup_station: config.pickup_station.clone(),
            require_phone: config.require_phone,
        }
    }
}

#[derive(Debug)]
pub enum CheckoutOutcome {
    Placed { order: Order, next: Navigation },
    /// Another submission was still pending; nothing was sent
    AlreadySubmitting,
}

/// Local checks run before anything is sent.
pub fn validate_form(
    form: &CheckoutForm,
    settings: &CheckoutSettings,
) -> Result<(), ValidationError> {
    if form.method == FulfilmentMethod::Delivery
        && form.delivery_address.chars().count() < MIN_ADDRESS_CHARS
    {
        return Err(ValidationError::AddressTooShort {
            min: MIN_ADDRESS_CHARS,
        });
    }

    if settings.require_phone {
        let kept = form
            .phone_number
            .trim()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .count();
        if kept < MIN_PHONE_CHARS {
            return Err(ValidationError::InvalidPhone {
                min: MIN_PHONE_CHARS,
            });
        }
    }

    Ok(())
}

/// Address sent with the order: the pickup station or the entered address,
/// prefixed with the contact phone when one is captured.
pub fn resolve_address(form: &CheckoutForm, settings: &CheckoutSettings) -> String {
    let base = match form.method {
        FulfilmentMethod::Pickup => settings.pickup_station.clone(),
        FulfilmentMethod::Delivery => form.delivery_address.clone(),
    };
    if settings.require_phone {
        format!("Phone: {}\n{}", form.phone_number.trim(), base)
    } else {
        base
    }
}

pub struct CheckoutFlow {
    api: Arc<dyn StorefrontApi>,
    session: Arc<SessionContext>,
    cart: CartStore,
    settings: CheckoutSettings,
    state: Mutex<CheckoutState>,
    submitting: AtomicBool,
}

impl CheckoutFlow {
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        session: Arc<SessionContext>,
        cart: CartStore,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            api,
            session,
            cart,
            settings,
            state: Mutex::new(CheckoutState::Idle),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Totals for the current cart under `method`
    pub fn totals(&self, method: FulfilmentMethod) -> Totals {
        cart_service::compute_totals(&self.cart.load(), method, self.settings.delivery_fee)
    }

    fn transition(&self, next: CheckoutState) {
        tracing::debug!("Checkout state -> {:?}", next);
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn fail(&self, error: CheckoutError) -> CheckoutError {
        self.transition(CheckoutState::Failed {
            message: error.user_message(),
        });
        error
    }

    pub async fn submit(&self, form: &CheckoutForm) -> Result<CheckoutOutcome, CheckoutError> {
        let Some(_in_flight) = InFlight::acquire(&self.submitting) else {
            tracing::debug!("Checkout already submitting, ignoring");
            return Ok(CheckoutOutcome::AlreadySubmitting);
        };

        let cart = self.cart.load();
        let rejection = if cart.is_empty() {
            Some(CheckoutError::EmptyCart)
        } else if !self.session.is_authenticated() {
            Some(CheckoutError::LoginRequired)
        } else if self.session.is_admin() {
            Some(CheckoutError::AdminForbidden)
        } else {
            None
        };
        if let Some(e) = rejection {
            // Rejected before validation: drop any outcome left from an earlier attempt
            self.transition(CheckoutState::Idle);
            return Err(e);
        }

        self.transition(CheckoutState::Validating);
        if let Err(e) = validate_form(form, &self.settings) {
            tracing::info!("Checkout form rejected: {}", e);
            return Err(self.fail(e.into()));
        }

        self.transition(CheckoutState::Submitting);
        let request = NewOrder::from_cart(&cart, resolve_address(form, &self.settings), form.method);
        let order = match self.api.create_order(&request).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!("Order creation failed: {}", e);
                return Err(self.fail(e.into()));
            }
        };

        // The order exists server-side; a local clear failure must not undo that
        if let Err(e) = cart_service::clear_cart(&self.cart, true) {
            tracing::error!("Order {} placed but the cart could not be cleared: {}", order.id, e);
        }

        tracing::info!(
            "Order {} placed ({} item(s), {} {})",
            order.id,
            request.items.len(),
            order.delivery_method,
            order.total_amount
        );
        self.transition(CheckoutState::Succeeded {
            order_id: order.id.clone(),
        });

        Ok(CheckoutOutcome::Placed {
            next: Navigation::Payment(order.id.clone()),
            order,
        })
    }
}
