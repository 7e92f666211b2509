//! Application state containing the scoped stores and shared clients

use std::sync::Arc;

use super::api_client::HttpStorefrontApi;
use super::config::Config;
use super::storage::FileStore;
use crate::domain::{AppInitError, KeyValueStore, StorefrontApi};
use crate::services::{
    CartNotifier, CartStore, CartWatcher, CheckoutFlow, CheckoutSettings, PaymentHandoff,
    SessionContext,
};

/// Everything a front-end needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Session scope: token and signed-in user
    pub session: Arc<SessionContext>,
    /// Cart scope: persisted cart plus its change notifier
    pub cart: CartStore,
    pub api: Arc<dyn StorefrontApi>,
    pub checkout: Arc<CheckoutFlow>,
    pub payment: Arc<PaymentHandoff>,
}

impl AppState {
    /// File-backed slots under `config.storage_dir` and the HTTP API client
    pub fn new(config: Config) -> Result<Self, AppInitError> {
        let store = Arc::new(FileStore::open(&config.storage_dir)?);
        Self::with_store(config, store)
    }

    /// Same wiring over any slot store
    pub fn with_store(
        config: Config,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppInitError> {
        let session = Arc::new(SessionContext::hydrate(store.clone()));
        let api: Arc<dyn StorefrontApi> = Arc::new(HttpStorefrontApi::new(
            &config.api_base_url,
            config.request_timeout,
            session.clone(),
        )?);
        Ok(Self::assemble(config, store, session, api))
    }

    /// Wire the services around an already built API client
    pub fn assemble(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        session: Arc<SessionContext>,
        api: Arc<dyn StorefrontApi>,
    ) -> Self {
        let cart = CartStore::new(store, CartNotifier::new());
        let checkout = Arc::new(CheckoutFlow::new(
            api.clone(),
            session.clone(),
            cart.clone(),
            CheckoutSettings::from(&config),
        ));
        let payment = Arc::new(PaymentHandoff::new(api.clone(), session.clone()));

        tracing::debug!(
            "App state ready (api {}, signed in: {})",
            config.api_base_url,
            session.is_authenticated()
        );

        Self {
            config,
            session,
            cart,
            api,
            checkout,
            payment,
        }
    }

    /// A new cart subscriber. Must be called inside a Tokio runtime.
    pub fn cart_watcher(&self) -> CartWatcher {
        CartWatcher::new(self.cart.clone(), self.config.cart_poll_interval)
    }
}
