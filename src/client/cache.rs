//! Optimistic list cache.
//!
//! The cache holds the todos currently on screen for one list query. Every
//! mutation follows the same protocol:
//!
//! 1. [`ListCache::begin`] snapshots the list and applies the change
//!    locally, returning a [`Mutation`] value that owns the snapshot.
//! 2. If the server call fails, [`ListCache::rollback`] consumes the
//!    mutation and restores the snapshot.
//! 3. Either way the mutation settles with an authoritative refetch:
//!    [`ListCache::begin_fetch`] hands out a token and
//!    [`ListCache::complete_fetch`] installs the response only if no newer
//!    fetch started in the meantime. Superseded responses are discarded,
//!    never merged, so a slow response can't overwrite a fresher one.
//!
//! Rollback and settlement are functions of the `Mutation` value itself;
//! there are no "dirty" flags to forget to clear.

use uuid::Uuid;

use crate::models::{ListQuery, Todo};

/// An optimistic change applied to the cached list before the server
/// confirms it.
#[derive(Debug, Clone)]
pub enum Change {
    /// A todo the server has not assigned yet; shown at the top since the
    /// list is newest-first.
    Create(Todo),
    Update {
        id: Uuid,
        title: String,
        description: String,
    },
    Toggle(Uuid),
    Delete(Uuid),
}

/// An in-flight optimistic mutation. Owns the pre-mutation snapshot.
///
/// Must be resolved: either [`ListCache::rollback`] on failure or
/// [`Mutation::settle`] once the server confirmed.
#[must_use = "an unresolved mutation leaves the cache optimistic forever"]
#[derive(Debug)]
pub struct Mutation {
    snapshot: Vec<Todo>,
}

impl Mutation {
    /// The server accepted the change; the snapshot is no longer needed.
    /// The caller still refetches to reconcile.
    pub fn settle(self) {}
}

/// Token identifying one list fetch, used to discard superseded responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// Client-side cache of the current filtered, paginated todo list.
#[derive(Debug, Default)]
pub struct ListCache {
    query: ListQuery,
    todos: Vec<Todo>,
    fetch_seq: u64,
}

impl ListCache {
    pub fn new(query: ListQuery) -> Self {
        Self {
            query,
            todos: Vec::new(),
            fetch_seq: 0,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Change the active query (new search text, page, or filter). The
    /// cached items are kept on screen until the next fetch completes.
    pub fn set_query(&mut self, query: ListQuery) {
        self.query = query;
    }

    /// Snapshot the list and apply `change` optimistically.
    pub fn begin(&mut self, change: Change) -> Mutation {
        let snapshot = self.todos.clone();
        self.apply(change);
        Mutation { snapshot }
    }

    /// Restore the pre-mutation snapshot. Consumes the mutation.
    pub fn rollback(&mut self, mutation: Mutation) {
        self.todos = mutation.snapshot;
    }

    /// Start a fetch, invalidating any fetch started earlier.
    pub fn begin_fetch(&mut self) -> FetchToken {
        self.fetch_seq += 1;
        FetchToken(self.fetch_seq)
    }

    /// Install a fetch response. Returns false (and changes nothing) when a
    /// newer fetch has started since `token` was issued.
    pub fn complete_fetch(&mut self, token: FetchToken, todos: Vec<Todo>) -> bool {
        if token.0 != self.fetch_seq {
            return false;
        }
        self.todos = todos;
        true
    }

    fn apply(&mut self, change: Change) {
        match change {
            Change::Create(todo) => self.todos.insert(0, todo),
            Change::Update {
                id,
                title,
                description,
            } => {
                if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
                    todo.title = title;
                    todo.description = description;
                }
            }
            Change::Toggle(id) => {
                if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
                    todo.done = !todo.done;
                }
            }
            Change::Delete(id) => self.todos.retain(|t| t.id != id),
        }
    }
}
