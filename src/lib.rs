//! doable: a small todo-list REST service and its caching HTTP client.
//!
//! The server side is [`db`] (SQLite-backed store and list query engine)
//! behind [`api`] (axum routes). The consumer side is [`client`]: a reqwest
//! client plus an optimistic list cache. [`error`] defines the shared
//! failure taxonomy and [`models`] the wire types.

pub mod api;
pub mod client;
pub mod db;
pub mod error;
pub mod models;
