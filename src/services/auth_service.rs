//! Auth Service - login and registration
//!
//! A rejected password here is an ordinary error; it never expires the
//! current session.

use crate::domain::{AuthError, StorefrontApi};
use crate::models::{LoginRequest, RegisterRequest, User};

use super::session::SessionContext;

/// Authenticate with an email or registration number.
pub async fn login(
    api: &dyn StorefrontApi,
    session: &SessionContext,
    email_or_reg_number: &str,
    password: &str,
) -> Result<User, AuthError> {
    tracing::info!("Login attempt for {}", email_or_reg_number);

    let request = LoginRequest {
        email_or_reg_number: email_or_reg_number.trim().to_string(),
        password: password.to_string(),
    };
    let auth = api.login(&request).await.map_err(|e| {
        tracing::warn!("Login failed for {}: {}", email_or_reg_number, e);
        AuthError::Login(e)
    })?;

    Ok(session.establish(auth)?)
}

pub async fn register(
    api: &dyn StorefrontApi,
    session: &SessionContext,
    request: RegisterRequest,
) -> Result<User, AuthError> {
    tracing::info!("Registering {} ({})", request.email, request.reg_number);

    let auth = api.register(&request).await.map_err(|e| {
        tracing::warn!("Registration failed for {}: {}", request.email, e);
        AuthError::Register(e)
    })?;

    Ok(session.establish(auth)?)
}
