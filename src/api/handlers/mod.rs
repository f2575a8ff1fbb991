use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::db::Database;
use crate::error::Error;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Boundary wrapper translating the error taxonomy to HTTP.
///
/// Validation failures carry a caller-safe message and are logged as noise,
/// not faults. Store failures are logged in full server-side; the caller
/// only ever sees a generic message.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            Error::Validation(msg) => {
                tracing::warn!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            Error::NotFound => (StatusCode::NOT_FOUND, "Todo not found".to_string()),
            Error::Store(e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

/// An id that does not even parse as a UUID cannot reference any todo.
fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError(Error::NotFound))
}

/// Like [`Query`], but a malformed query string (bad bool, non-numeric page)
/// answers with the `{"message": ...}` envelope instead of axum's plain-text
/// rejection.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(Error::Validation(rejection.body_text()))),
        }
    }
}

/// Like [`Json`], but an unparseable body answers with the `{"message": ...}`
/// envelope instead of axum's plain-text 422.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(Error::Validation(rejection.body_text()))),
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Todos
// ============================================================

pub async fn list_todos(
    State(db): State<Database>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<TodoPage>, ApiError> {
    let page = db.list_todos(&query)?;
    tracing::debug!(
        count = page.todos.len(),
        total = page.total,
        page = page.page,
        "Fetched todos"
    );
    Ok(Json(page))
}

pub async fn create_todo(
    State(db): State<Database>,
    ApiJson(input): ApiJson<CreateTodoInput>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = db.create_todo(input)?;
    tracing::info!(id = %todo.id, title = %todo.title, "Created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(db): State<Database>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateTodoInput>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let todo = db.update_todo(id, input)?;
    tracing::info!(id = %todo.id, "Updated todo");
    Ok(Json(todo))
}

pub async fn toggle_done(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let todo = db.toggle_done(id)?;
    tracing::info!(id = %todo.id, done = todo.done, "Toggled todo");
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    db.delete_todo(id)?;
    tracing::info!(id = %id, "Deleted todo");
    Ok(Json(serde_json::json!({
        "message": "Todo deleted successfully"
    })))
}
