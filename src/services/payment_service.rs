//! Payment Service - hands a placed order off to the external cashier page
//!
//! Nothing about payment is persisted locally; "paid" is only ever read back
//! from the order.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use url::Url;

use super::in_flight::InFlight;
use super::session::SessionContext;
use crate::domain::{PaymentError, StorefrontApi};
use crate::models::{Order, PaymentSession, PaymentStatusReport};

#[derive(Debug)]
pub enum PaymentView {
    /// Terminal, no action offered
    AlreadyPaid(Order),
    AwaitingPayment(Order),
}

impl PaymentView {
    pub fn order(&self) -> &Order {
        match self {
            PaymentView::AlreadyPaid(order) | PaymentView::AwaitingPayment(order) => order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentRedirect {
    Navigate(String),
    /// An initiation was still pending; nothing was sent
    AlreadyPending,
}

pub struct PaymentHandoff {
    api: Arc<dyn StorefrontApi>,
    session: Arc<SessionContext>,
    initiating: AtomicBool,
}

impl PaymentHandoff {
    pub fn new(api: Arc<dyn StorefrontApi>, session: Arc<SessionContext>) -> Self {
        Self {
            api,
            session,
            initiating: AtomicBool::new(false),
        }
    }

    fn require_session(&self) -> Result<(), PaymentError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(PaymentError::LoginRequired)
        }
    }

    pub async fn load_order(&self, order_id: &str) -> Result<PaymentView, PaymentError> {
        self.require_session()?;
        let order = self
            .api
            .get_order(order_id)
            .await
            .map_err(PaymentError::LoadOrder)?;

        if order.is_paid() {
            tracing::debug!("Order {} already paid", order.id);
            Ok(PaymentView::AlreadyPaid(order))
        } else {
            Ok(PaymentView::AwaitingPayment(order))
        }
    }

    /// Ask the server for a cashier session and return where to send the user.
    pub async fn initiate_payment(&self, order_id: &str) -> Result<PaymentRedirect, PaymentError> {
        self.require_session()?;
        let Some(_in_flight) = InFlight::acquire(&self.initiating) else {
            tracing::debug!("Payment initiation already pending, ignoring");
            return Ok(PaymentRedirect::AlreadyPending);
        };

        let payment = self
            .api
            .initiate_cashier_payment(order_id)
            .await
            .map_err(PaymentError::Initiate)?;

        let url = redirect_url(&payment).ok_or(PaymentError::MissingRedirect)?;
        tracing::info!(
            "Payment initiated for order {} (reference {})",
            order_id,
            payment.reference.as_deref().unwrap_or("-")
        );
        Ok(PaymentRedirect::Navigate(url))
    }

    pub async fn payment_status(&self, reference: &str) -> Result<PaymentStatusReport, PaymentError> {
        self.require_session()?;
        self.api
            .payment_status(reference)
            .await
            .map_err(PaymentError::Status)
    }
}

/// The cashier URL, if it is an absolute http(s) URL
fn redirect_url(payment: &PaymentSession) -> Option<String> {
    let raw = payment.cashier_url.as_deref()?.trim();
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.into()),
        Ok(url) => {
            tracing::warn!("Ignoring cashier url with scheme '{}'", url.scheme());
            None
        }
        Err(e) => {
            tracing::warn!("Ignoring unparsable cashier url: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(url: Option<&str>) -> PaymentSession {
        PaymentSession {
            cashier_url: url.map(str::to_string),
            reference: Some("ref-1".to_string()),
        }
    }

    #[test]
    fn test_redirect_url_validation() {
        assert_eq!(
            redirect_url(&session(Some("https://pay.example.com/c/abc"))).as_deref(),
            Some("https://pay.example.com/c/abc")
        );
        assert_eq!(redirect_url(&session(None)), None);
        assert_eq!(redirect_url(&session(Some(""))), None);
        assert_eq!(redirect_url(&session(Some("   "))), None);
        assert_eq!(redirect_url(&session(Some("/relative/path"))), None);
        assert_eq!(redirect_url(&session(Some("javascript:alert(1)"))), None);
    }
}
