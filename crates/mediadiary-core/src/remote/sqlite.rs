//! SQLite-backed document store.
//!
//! Documents live in a single table keyed by `(collection, id)` with the body
//! stored as JSON text. Queries compile to `json_extract` predicates.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use serde_json::Value;

use super::{split_document_path, Direction, Document, DocumentStore, DocumentTransaction};
use super::{FilterOp, Query};
use crate::error::{DiaryError, Result};

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        data_json TEXT NOT NULL,
        updated_at TEXT NOT NULL,

        PRIMARY KEY (collection, id)
    );
"#;

/// Document store over a SQLite database file (or memory).
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Attempts before a busy transaction is reported as a storage error.
    pub const MAX_TRANSACTION_ATTEMPTS: u32 = 5;
    const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

    /// Open (and create if needed) a store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Self::BUSY_TIMEOUT)?;
        Self::init(conn)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DiaryError::Storage("SQLite connection poisoned".to_string()))
    }

    /// One transaction attempt. The outer error is a SQLite failure at
    /// begin/commit (possibly retryable); the inner result is the body's.
    fn attempt<T, F>(
        conn: &mut Connection,
        body: &mut F,
    ) -> std::result::Result<Result<T>, rusqlite::Error>
    where
        F: FnMut(&mut dyn DocumentTransaction) -> Result<T>,
    {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = {
            let mut handle = SqliteTransaction { conn: &tx };
            body(&mut handle)
        };
        match outcome {
            Ok(value) => {
                tx.commit()?;
                Ok(Ok(value))
            }
            // Dropping the transaction rolls it back.
            Err(err) => Ok(Err(err)),
        }
    }
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    )
}

fn read_document(conn: &Connection, path: &str) -> Result<Option<Document>> {
    let (collection, id) = split_document_path(path)?;
    let data: Option<String> = conn
        .query_row(
            "SELECT data_json FROM documents WHERE collection = ?1 AND id = ?2",
            [collection, id],
            |row| row.get(0),
        )
        .optional()?;
    data.map(|json| parse_document(&json)).transpose()
}

fn write_document(conn: &Connection, path: &str, document: &Document) -> Result<()> {
    let (collection, id) = split_document_path(path)?;
    let data_json = serde_json::to_string(document)?;
    conn.execute(
        "INSERT INTO documents (collection, id, data_json, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (collection, id) DO UPDATE
         SET data_json = excluded.data_json, updated_at = excluded.updated_at",
        rusqlite::params![collection, id, data_json, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn parse_document(json: &str) -> Result<Document> {
    match serde_json::from_str(json)? {
        Value::Object(map) => Ok(map),
        _ => Err(DiaryError::Storage(
            "Stored document is not a JSON object".to_string(),
        )),
    }
}

fn sql_value(value: &Value) -> Result<SqlValue> {
    match value {
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Real(f))
            } else {
                Err(DiaryError::InvalidInput(format!("Unsupported number: {}", n)))
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        other => Err(DiaryError::InvalidInput(format!(
            "Unsupported filter value: {}",
            other
        ))),
    }
}

/// Compile a validated query into SQL text and parameters.
fn compile(query: &Query) -> Result<(String, Vec<SqlValue>)> {
    let mut sql = String::from("SELECT data_json FROM documents WHERE collection = ?");
    let mut params = vec![SqlValue::Text(query.collection.clone())];

    for predicate in &query.predicates {
        let path = SqlValue::Text(format!("$.{}", predicate.field));
        match (predicate.op, &predicate.value) {
            (FilterOp::Eq, Value::Null) => {
                sql.push_str(" AND json_extract(data_json, ?) IS NULL");
                params.push(path);
            }
            (FilterOp::In, Value::Array(values)) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                sql.push_str(&format!(
                    " AND json_extract(data_json, ?) IN ({})",
                    placeholders
                ));
                params.push(path);
                for value in values {
                    params.push(sql_value(value)?);
                }
            }
            (op, value) => {
                let symbol = match op {
                    FilterOp::Eq => "=",
                    FilterOp::Lt => "<",
                    FilterOp::Le => "<=",
                    FilterOp::Gt => ">",
                    FilterOp::Ge => ">=",
                    FilterOp::In => {
                        return Err(DiaryError::InvalidInput(
                            "In filter needs an array value".to_string(),
                        ))
                    }
                };
                sql.push_str(&format!(" AND json_extract(data_json, ?) {} ?", symbol));
                params.push(path);
                params.push(sql_value(value)?);
            }
        }
    }

    match &query.order_by {
        Some(order) => {
            let direction = match order.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            sql.push_str(&format!(
                " ORDER BY json_extract(data_json, ?) {}, id ASC",
                direction
            ));
            params.push(SqlValue::Text(format!("$.{}", order.field)));
        }
        None => sql.push_str(" ORDER BY id ASC"),
    }

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        params.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    }

    Ok((sql, params))
}

struct SqliteTransaction<'a> {
    conn: &'a Connection,
}

impl DocumentTransaction for SqliteTransaction<'_> {
    fn get(&mut self, path: &str) -> Result<Option<Document>> {
        read_document(self.conn, path)
    }

    fn set(&mut self, path: &str, document: Document) -> Result<()> {
        write_document(self.conn, path, &document)
    }

    fn update(&mut self, path: &str, fields: Document) -> Result<()> {
        let mut document = read_document(self.conn, path)?
            .ok_or_else(|| DiaryError::NotFound(format!("No document at {}", path)))?;
        for (key, value) in fields {
            document.insert(key, value);
        }
        write_document(self.conn, path, &document)
    }
}

impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Document>> {
        let conn = self.lock_conn()?;
        read_document(&conn, path)
    }

    async fn set(&self, path: &str, document: Document) -> Result<()> {
        let conn = self.lock_conn()?;
        write_document(&conn, path, &document)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        query.validate()?;
        let (sql, params) = compile(query)?;
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            row.get::<_, String>(0)
        })?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(parse_document(&row?)?);
        }
        Ok(documents)
    }

    async fn run_transaction<T, F>(&self, mut body: F) -> Result<T>
    where
        F: FnMut(&mut dyn DocumentTransaction) -> Result<T>,
    {
        let mut conn = self.lock_conn()?;
        let mut attempts = 0;
        loop {
            attempts += 1;
            match Self::attempt(&mut conn, &mut body) {
                Ok(outcome) => return outcome,
                Err(err) if is_busy(&err) && attempts < Self::MAX_TRANSACTION_ATTEMPTS => {
                    tracing::warn!(attempt = attempts, error = %err, "document transaction busy; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
