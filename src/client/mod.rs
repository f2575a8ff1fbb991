//! HTTP client and local cache for the doable API.
//!
//! Configuration is via environment variables:
//! - `DOABLE_API_URL` - Base URL (default: `http://localhost:3001/api`)

mod cache;
mod debounce;

pub use cache::{Change, FetchToken, ListCache, Mutation};
pub use debounce::Debouncer;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// Default URL for local development.
const DEFAULT_URL: &str = "http://localhost:3001/api";

/// Page size preset used by the client's list views. The server defaults to
/// 10 when the parameter is omitted; list views ask for slightly more.
pub const CLIENT_PAGE_SIZE: u32 = 15;

/// The query a fresh list view starts from.
pub fn default_query() -> ListQuery {
    ListQuery {
        limit: Some(CLIENT_PAGE_SIZE),
        ..Default::default()
    }
}

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// HTTP client for the doable API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    client: Client,
}

impl TodoClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("DOABLE_API_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::new(base_url)
    }

    /// Create with an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    // ============================================================
    // Todo Operations
    // ============================================================

    /// Fetch one page of todos.
    pub async fn list(&self, query: &ListQuery) -> Result<TodoPage, ClientError> {
        let response = self
            .request(reqwest::Method::GET, "/todos")
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Create a new todo.
    pub async fn create(&self, input: &CreateTodoInput) -> Result<Todo, ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/todos")
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Replace a todo's title and description.
    pub async fn update(&self, id: Uuid, input: &UpdateTodoInput) -> Result<Todo, ClientError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/todos/{}", id))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Flip a todo's done flag.
    pub async fn toggle_done(&self, id: Uuid) -> Result<Todo, ClientError> {
        let response = self
            .request(reqwest::Method::PATCH, &format!("/todos/{}/done", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Permanently delete a todo.
    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/todos/{}", id))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
            _ => Err(ClientError::Server(format!("{}: {}", status, body))),
        }
    }

    // ============================================================
    // Cached flows
    // ============================================================
    //
    // Each flow applies the change to the cache first, calls the server,
    // rolls back on failure, and then reconciles with one authoritative
    // fetch whether the call succeeded or not. The refetch is best-effort:
    // a failure there leaves the rolled-back (or settled) list in place and
    // the caller keeps the mutation's own error, if any.

    /// Refetch the cache's current query and install the result unless a
    /// newer fetch has superseded this one.
    pub async fn refresh(&self, cache: &mut ListCache) -> Result<(), ClientError> {
        let token = cache.begin_fetch();
        let page = self.list(cache.query()).await?;
        cache.complete_fetch(token, page.todos);
        Ok(())
    }

    pub async fn create_cached(
        &self,
        cache: &mut ListCache,
        input: &CreateTodoInput,
    ) -> Result<Todo, ClientError> {
        let result = self.create(input).await;
        if let Ok(todo) = &result {
            let mutation = cache.begin(Change::Create(todo.clone()));
            mutation.settle();
        }
        let _ = self.refresh(cache).await;
        result
    }

    pub async fn update_cached(
        &self,
        cache: &mut ListCache,
        id: Uuid,
        input: &UpdateTodoInput,
    ) -> Result<Todo, ClientError> {
        let mutation = cache.begin(Change::Update {
            id,
            title: input.title.clone(),
            description: input.description.clone().unwrap_or_default(),
        });
        let result = self.update(id, input).await;
        match &result {
            Ok(_) => mutation.settle(),
            Err(_) => cache.rollback(mutation),
        }
        let _ = self.refresh(cache).await;
        result
    }

    pub async fn toggle_cached(
        &self,
        cache: &mut ListCache,
        id: Uuid,
    ) -> Result<Todo, ClientError> {
        let mutation = cache.begin(Change::Toggle(id));
        let result = self.toggle_done(id).await;
        match &result {
            Ok(_) => mutation.settle(),
            Err(_) => cache.rollback(mutation),
        }
        let _ = self.refresh(cache).await;
        result
    }

    pub async fn delete_cached(&self, cache: &mut ListCache, id: Uuid) -> Result<(), ClientError> {
        let mutation = cache.begin(Change::Delete(id));
        let result = self.delete(id).await;
        match &result {
            Ok(()) => mutation.settle(),
            Err(_) => cache.rollback(mutation),
        }
        let _ = self.refresh(cache).await;
        result
    }
}
