//! Session / identity context
//!
//! Holds the signed-in user and bearer token in memory, mirrored to the
//! `token` and `user` slots. Hydrated once at startup.

use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

use crate::domain::{CredentialSource, KeyValueStore, StorageError, slots};
use crate::models::{AuthResponse, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    /// The server rejected the token; the session was cleared
    Expired,
}

struct Session {
    token: SecretString,
    user: User,
}

pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    /// Restore the session from durable slots; absent or malformed data
    /// starts unauthenticated.
    pub fn hydrate(store: Arc<dyn KeyValueStore>) -> Self {
        let current = match (store.get(slots::TOKEN), store.get(slots::USER)) {
            (Ok(Some(token)), Ok(Some(user))) if !token.is_empty() => {
                match serde_json::from_str::<User>(&user) {
                    Ok(user) => {
                        tracing::info!("Restored session for {}", user.email);
                        Some(Session {
                            token: SecretString::new(token),
                            user,
                        })
                    }
                    Err(e) => {
                        tracing::warn!("Stored user record is malformed, starting signed out: {}", e);
                        None
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!("Could not read stored session: {}", e);
                None
            }
            _ => None,
        };

        let (events, _) = broadcast::channel(16);
        Self {
            store,
            current: RwLock::new(current),
            events,
        }
    }

    /// Store a freshly issued token and user, in memory and in the slots.
    pub fn establish(&self, auth: AuthResponse) -> Result<User, StorageError> {
        let user_json = serde_json::to_string(&auth.user)?;
        self.store.set(slots::TOKEN, &auth.token)?;
        self.store.set(slots::USER, &user_json)?;

        let user = auth.user;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            token: SecretString::new(auth.token),
            user: user.clone(),
        });
        tracing::info!("Signed in as {} ({})", user.email, user.role);
        let _ = self.events.send(SessionEvent::SignedIn);
        Ok(user)
    }

    /// Sign out locally. Never fails and never calls the server.
    pub fn logout(&self) {
        self.clear();
        tracing::info!("Signed out");
        let _ = self.events.send(SessionEvent::SignedOut);
    }

    /// Sign out because the server no longer accepts the token.
    pub fn force_logout(&self) {
        let was_signed_in = self.is_authenticated();
        self.clear();
        if was_signed_in {
            tracing::warn!("Session expired, signed out");
        }
        let _ = self.events.send(SessionEvent::Expired);
    }

    fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        for slot in [slots::TOKEN, slots::USER] {
            if let Err(e) = self.store.remove(slot) {
                tracing::error!("Failed to clear slot '{}': {}", slot, e);
            }
        }
    }

    pub fn user(&self) -> Option<User> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|session| session.user.is_admin())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

impl CredentialSource for SessionContext {
    fn bearer_token(&self) -> Option<SecretString> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| SecretString::new(session.token.expose_secret().clone()))
    }

    fn credentials_rejected(&self) {
        self.force_logout();
    }
}
