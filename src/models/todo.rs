use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size for the list endpoint.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A single todo item.
///
/// `created_at` is set once at creation and never changes; `updated_at` is
/// refreshed on every mutation, including a done toggle, so
/// `updated_at >= created_at` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new todo. `done` always starts false.
///
/// A body with no `title` field deserializes to an empty title, so missing
/// and empty titles take the same validation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

/// Input for updating a todo's text. Replaces both fields; an omitted
/// description resets it to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodoInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

/// Query parameters accepted by the list endpoint.
///
/// All fields are optional on the wire; the accessors apply defaults and
/// clamp out-of-range values instead of erroring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub done: Option<bool>,
}

impl ListQuery {
    /// Requested page, 1-based. Zero clamps to 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size. Zero clamps to 1.
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    /// Search text, with empty and whitespace-only treated as "no filter".
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Envelope returned by the list endpoint.
///
/// `total` and `pages` describe the *filtered* result set, while
/// `total_pending` and `total_done` count the whole store regardless of the
/// active filter. They feed the summary cards next to the list, which must
/// not change as the user searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub total_pending: u64,
    pub total_done: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_apply_when_unset() {
        let q = ListQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(q.search(), None);
        assert_eq!(q.done, None);
    }

    #[test]
    fn zero_page_and_limit_clamp_to_one() {
        let q = ListQuery {
            page: Some(0),
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 1);
    }

    #[test]
    fn blank_search_means_no_filter() {
        let q = ListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(q.search(), None);

        let q = ListQuery {
            search: Some("  milk ".to_string()),
            ..Default::default()
        };
        assert_eq!(q.search(), Some("milk"));
    }

    #[test]
    fn missing_title_deserializes_to_empty() {
        let input: CreateTodoInput =
            serde_json::from_value(serde_json::json!({ "description": "no title field" }))
                .unwrap();
        assert_eq!(input.title, "");

        let input: UpdateTodoInput = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(input.title, "");
    }

    #[test]
    fn todo_serializes_camel_case() {
        let todo = Todo {
            id: Uuid::nil(),
            title: "Buy milk".to_string(),
            description: String::new(),
            done: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
