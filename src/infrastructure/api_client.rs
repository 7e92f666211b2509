//! HTTP implementation of the storefront API
//!
//! Every response body is wrapped as `{ "data": ... }`; error bodies carry a
//! `message`. A 401 on any authenticated call clears the session through the
//! credential source before the error is returned.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::domain::{ApiError, CredentialSource, StorefrontApi};
use crate::models::{
    AuthResponse, Book, BookForm, LoginRequest, NewOrder, Order, OrderStatus, PaymentSession,
    PaymentStatusReport, RegisterRequest,
};

const USER_AGENT: &str = concat!("bookmate/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error")]
    message: Option<String>,
}

/// Whether a 401 means "session expired" or just "wrong credentials"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Realm {
    Credentials,
    Session,
}

#[derive(Clone)]
pub struct HttpStorefrontApi {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
}

impl HttpStorefrontApi {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::Configuration(format!("bad base url '{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Configuration(format!(
                "base url must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match self.credentials.bearer_token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder, realm: Realm) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("{} {}", status.as_u16(), response.url().path());

        if status == StatusCode::UNAUTHORIZED && realm == Realm::Session {
            tracing::warn!("Authorization rejected by {}, ending session", response.url().path());
            self.credentials.credentials_rejected();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: body.message,
            });
        }

        Ok(response)
    }

    async fn data<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        realm: Realm,
    ) -> Result<T, ApiError> {
        let response = self.execute(builder, realm).await?;
        let body = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Decode(format!("{}", e)))?;
        Ok(envelope.data)
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn book_multipart(form: &BookForm) -> Result<Form, ApiError> {
    let mut multipart = Form::new()
        .text("title", form.title.clone())
        .text("author", form.author.clone())
        .text("price", form.price.to_string())
        .text("stock", form.stock.to_string());

    if let Some(category) = form.category {
        multipart = multipart.text("category", category.as_str());
    }
    if let Some(level) = &form.class_form_level {
        multipart = multipart.text("classFormLevel", level.clone());
    }
    if let Some(cover) = &form.cover {
        let part = Part::bytes(cover.bytes.clone())
            .file_name(cover.file_name.clone())
            .mime_str(&cover.mime_type)?;
        multipart = multipart.part("coverImage", part);
    }

    Ok(multipart)
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let builder = self.request(Method::POST, "/auth/register").json(request);
        self.data(builder, Realm::Credentials).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let builder = self.request(Method::POST, "/auth/login").json(request);
        self.data(builder, Realm::Credentials).await
    }

    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        self.data(self.request(Method::GET, "/books"), Realm::Session)
            .await
    }

    async fn get_book(&self, id: &str) -> Result<Book, ApiError> {
        let path = format!("/books/{}", segment(id));
        self.data(self.request(Method::GET, &path), Realm::Session)
            .await
    }

    async fn create_book(&self, form: &BookForm) -> Result<Book, ApiError> {
        let builder = self
            .request(Method::POST, "/books")
            .multipart(book_multipart(form)?);
        self.data(builder, Realm::Session).await
    }

    async fn update_book(&self, id: &str, form: &BookForm) -> Result<Book, ApiError> {
        let path = format!("/books/{}", segment(id));
        let builder = self
            .request(Method::PUT, &path)
            .multipart(book_multipart(form)?);
        self.data(builder, Realm::Session).await
    }

    async fn delete_book(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/books/{}", segment(id));
        self.execute(self.request(Method::DELETE, &path), Realm::Session)
            .await?;
        Ok(())
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let builder = self.request(Method::POST, "/orders").json(order);
        self.data(builder, Realm::Session).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.data(self.request(Method::GET, "/orders"), Realm::Session)
            .await
    }

    async fn get_order(&self, id: &str) -> Result<Order, ApiError> {
        let path = format!("/orders/{}", segment(id));
        self.data(self.request(Method::GET, &path), Realm::Session)
            .await
    }

    async fn cancel_order(&self, id: &str) -> Result<Order, ApiError> {
        let path = format!("/orders/{}", segment(id));
        self.data(self.request(Method::DELETE, &path), Realm::Session)
            .await
    }

    async fn initiate_cashier_payment(
        &self,
        order_id: &str,
    ) -> Result<PaymentSession, ApiError> {
        let builder = self
            .request(Method::POST, "/payments/initiate-cashier")
            .json(&serde_json::json!({ "orderId": order_id }));
        self.data(builder, Realm::Session).await
    }

    async fn payment_status(&self, reference: &str) -> Result<PaymentStatusReport, ApiError> {
        let path = format!("/payments/status/{}", segment(reference));
        self.data(self.request(Method::GET, &path), Realm::Session)
            .await
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.data(self.request(Method::GET, "/admin/orders"), Realm::Session)
            .await
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let path = format!("/admin/orders/{}/status", segment(id));
        let builder = self
            .request(Method::PUT, &path)
            .json(&serde_json::json!({ "orderStatus": status }));
        self.data(builder, Realm::Session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    struct NoCredentials;

    impl CredentialSource for NoCredentials {
        fn bearer_token(&self) -> Option<SecretString> {
            None
        }

        fn credentials_rejected(&self) {}
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = HttpStorefrontApi::new(
            "ftp://bookmate.example",
            Duration::from_secs(5),
            Arc::new(NoCredentials),
        );
        assert!(matches!(result, Err(ApiError::Configuration(_))));

        let result =
            HttpStorefrontApi::new("not a url", Duration::from_secs(5), Arc::new(NoCredentials));
        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let api = HttpStorefrontApi::new(
            "http://localhost:5000/api/",
            Duration::from_secs(5),
            Arc::new(NoCredentials),
        )
        .unwrap();
        assert_eq!(api.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
