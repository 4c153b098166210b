//! Storefront API client.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    api::{
        errors::{ApiError, error_for_status},
        models::{
            AdminAuth, Book, BookId, BookUpdate, CustomerAuth, NewBook, Order, OrderId,
            OrderStatus,
        },
    },
    session::SessionStore,
};

/// Configuration for reaching the storefront backend.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend address, e.g. `"https://shop.example.com"`. The shared
    /// `/api` prefix is appended by the client.
    pub base_url: String,
}

/// HTTP client for the storefront backend.
///
/// Attaches the current session's bearer token to every request and maps
/// every failure to [`ApiError`]. One method per backend operation, no
/// retries; callers that want to retry do so themselves.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    config: StorefrontConfig,
    session: Arc<SessionStore>,
    http: Client,
}

impl StorefrontClient {
    #[must_use]
    pub fn new(config: StorefrontConfig, session: Arc<SessionStore>) -> Self {
        Self {
            config,
            session,
            http: Client::new(),
        }
    }

    /// Register a new customer account.
    ///
    /// A password/confirmation mismatch is rejected locally, before any
    /// request is made.
    ///
    /// # Errors
    ///
    /// Returns an error on mismatching passwords, HTTP failure, or a
    /// rejection from the backend.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<CustomerAuth, ApiError> {
        if password != confirmation {
            return Err(ApiError::PasswordMismatch);
        }

        let body = serde_json::json!({ "email": email, "password": password });

        self.post_json("/auth/register", &body).await
    }

    /// Log a customer in.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or rejected credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<CustomerAuth, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });

        self.post_json("/auth/login", &body).await
    }

    /// Log the administrator in.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or rejected credentials.
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<AdminAuth, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });

        self.post_json("/auth/admin/login", &body).await
    }

    /// The full catalog.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or a non-2xx response.
    pub async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        self.get_json("/books").await
    }

    /// A single catalog entry.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or when the book does not exist.
    pub async fn get_book(&self, book_id: BookId) -> Result<Book, ApiError> {
        self.get_json(&format!("/books/{book_id}")).await
    }

    /// Add a book to the catalog. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload fails local validation, on HTTP
    /// failure, or on a non-2xx response.
    pub async fn create_book(&self, book: NewBook) -> Result<Book, ApiError> {
        book.validate()?;

        self.post_json("/admin/books", &book).await
    }

    /// Update fields of an existing book. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload fails local validation, on HTTP
    /// failure, or on a non-2xx response.
    pub async fn update_book(&self, book_id: BookId, update: BookUpdate) -> Result<Book, ApiError> {
        update.validate()?;

        let response = self
            .authorized(self.http.put(self.url(&format!("/admin/books/{book_id}"))))
            .json(&update)
            .send()
            .await?;

        decode(response).await
    }

    /// Remove a book from the catalog. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or when the book does not exist.
    pub async fn delete_book(&self, book_id: BookId) -> Result<(), ApiError> {
        let response = self
            .authorized(
                self.http
                    .delete(self.url(&format!("/admin/books/{book_id}"))),
            )
            .send()
            .await?;

        error_for_status(response).await?;

        Ok(())
    }

    /// Every order across all customers. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or a non-2xx response.
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json("/admin/orders").await
    }

    /// Move an order to a new fulfilment status. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or when the order does not exist.
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "status": status });

        let response = self
            .authorized(
                self.http
                    .put(self.url(&format!("/admin/orders/{order_id}/status"))),
            )
            .json(&body)
            .send()
            .await?;

        error_for_status(response).await?;

        Ok(())
    }

    /// Seed the catalog with demo inventory. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or a non-2xx response.
    pub async fn init_sample_data(&self) -> Result<(), ApiError> {
        let response = self
            .authorized(self.http.post(self.url("/admin/init-sample-data")))
            .send()
            .await?;

        error_for_status(response).await?;

        Ok(())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.config.base_url)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Attach the current session's token, when there is one. Guest
    /// requests go out bare and the backend decides what they may do.
    pub(crate) fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => request.bearer_auth(token.reveal()),
            None => request,
        }
    }

    pub(crate) async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.authorized(self.http.get(self.url(path))).send().await?;

        decode(response).await
    }

    pub(crate) async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .authorized(self.http.post(self.url(path)))
            .json(body)
            .send()
            .await?;

        decode(response).await
    }
}

pub(crate) async fn decode<T>(response: Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let response = error_for_status(response).await?;

    Ok(response.json().await?)
}
