mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "doable")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("doable.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Query engine
    // ============================================================

    /// List todos matching `query`, windowed to the requested page.
    ///
    /// A todo matches when the done filter is unset or equal, AND the search
    /// text (if any) is a case-insensitive substring of the title or the
    /// description. Results are newest first; ties keep insertion order.
    ///
    /// `total_pending` and `total_done` count the whole table, not the
    /// filtered set. The summary cards they feed must not move when the user
    /// types a search or switches the status filter.
    pub fn list_todos(&self, query: &ListQuery) -> Result<TodoPage> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(done) = query.done {
            clauses.push("done = ?");
            params.push(Box::new(done));
        }
        if let Some(search) = query.search() {
            clauses.push(
                "(title LIKE '%' || ? || '%' ESCAPE '\\'
                  OR description LIKE '%' || ? || '%' ESCAPE '\\')",
            );
            let pattern = escape_like(search);
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let total: u64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM todos{}", where_sql),
            params_ref.as_slice(),
            |row| row.get::<_, i64>(0).map(|n| n as u64),
        )?;

        let page = query.page();
        let limit = query.limit();

        let sql = format!(
            "SELECT id, title, description, done, created_at, updated_at
             FROM todos{} ORDER BY created_at DESC, rowid ASC LIMIT ? OFFSET ?",
            where_sql
        );
        let mut stmt = conn.prepare(&sql)?;

        let limit_param = i64::from(limit);
        let offset_param = i64::from(page - 1) * i64::from(limit);
        let mut window_params = params_ref;
        window_params.push(&limit_param);
        window_params.push(&offset_param);

        let todos = stmt
            .query_map(window_params.as_slice(), read_todo)?
            .collect::<Result<Vec<_>, _>>()?;

        let total_pending = count_where(&conn, "done = 0")?;
        let total_done = count_where(&conn, "done = 1")?;

        Ok(TodoPage {
            todos,
            total,
            page,
            pages: total.div_ceil(u64::from(limit)).max(1) as u32,
            total_pending,
            total_done,
        })
    }

    // ============================================================
    // Command operations
    // ============================================================

    pub fn create_todo(&self, input: CreateTodoInput) -> Result<Todo> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }
        let description = input.description.unwrap_or_default();

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO todos (id, title, description, done, created_at, updated_at)
             VALUES (?, ?, ?, 0, ?, ?)",
            (
                id.to_string(),
                title,
                &description,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Todo {
            id,
            title: title.to_string(),
            description,
            done: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_todo(&self, id: Uuid) -> Result<Todo> {
        let conn = self.conn.lock().expect("database lock poisoned");
        fetch_todo(&conn, id)
    }

    /// Replace a todo's title and description, refreshing `updated_at`.
    ///
    /// Title emptiness is validated here as well as in create; the original
    /// form is not the only caller of this API. The read and the write share
    /// one lock hold, so a concurrent delete cannot land in between.
    pub fn update_todo(&self, id: Uuid, input: UpdateTodoInput) -> Result<Todo> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }
        let description = input.description.unwrap_or_default();

        let conn = self.conn.lock().expect("database lock poisoned");
        let existing = fetch_todo(&conn, id)?;

        let now = Utc::now();
        conn.execute(
            "UPDATE todos SET title = ?, description = ?, updated_at = ? WHERE id = ?",
            (title, &description, now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Todo {
            title: title.to_string(),
            description,
            updated_at: now,
            ..existing
        })
    }

    /// Flip a todo's done flag. Two calls return it to its original state.
    /// Read and write share one lock hold, as in [`Self::update_todo`].
    pub fn toggle_done(&self, id: Uuid) -> Result<Todo> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let existing = fetch_todo(&conn, id)?;

        let now = Utc::now();
        let done = !existing.done;
        conn.execute(
            "UPDATE todos SET done = ?, updated_at = ? WHERE id = ?",
            (done, now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Todo {
            done,
            updated_at: now,
            ..existing
        })
    }

    /// Hard delete. There is no tombstone; the id is gone for good.
    pub fn delete_todo(&self, id: Uuid) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM todos WHERE id = ?", [id.to_string()])?;
        if rows > 0 {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn fetch_todo(conn: &Connection, id: Uuid) -> Result<Todo> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, done, created_at, updated_at
         FROM todos WHERE id = ?",
    )?;

    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(read_todo(row)?),
        None => Err(Error::NotFound),
    }
}

fn count_where(conn: &Connection, clause: &str) -> Result<u64> {
    let n: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM todos WHERE {}", clause),
        [],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

fn read_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: parse_uuid(row.get::<_, String>(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        done: row.get::<_, i32>(3)? != 0,
        created_at: parse_datetime(row.get::<_, String>(4)?),
        updated_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

/// Escape LIKE metacharacters so user search text matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
