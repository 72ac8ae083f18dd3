//! Remote document store abstraction.
//!
//! The `DocumentStore` trait is the seam between the state store / chart
//! service and whatever backs user documents. It mirrors a document database:
//! documents addressed by `collection/id` paths, a conjunctive query builder,
//! and a transaction primitive whose body may be re-run on conflict.

mod query;
mod sqlite;

pub use query::{Direction, FilterOp, OrderBy, Predicate, Query};
pub use sqlite::SqliteDocumentStore;

use crate::error::{DiaryError, Result};

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Operations available inside [`DocumentStore::run_transaction`].
pub trait DocumentTransaction {
    /// Read a document, `Ok(None)` if it does not exist.
    fn get(&mut self, path: &str) -> Result<Option<Document>>;

    /// Create or replace a document.
    fn set(&mut self, path: &str, document: Document) -> Result<()>;

    /// Merge top-level fields into an existing document.
    ///
    /// # Errors
    ///
    /// Returns `DiaryError::NotFound` if the document does not exist.
    fn update(&mut self, path: &str, fields: Document) -> Result<()>;
}

/// Remote document store interface.
///
/// Implementations must guarantee that a transaction body observes and
/// writes a consistent snapshot, and that concurrent transactions on the same
/// document serialize. Bodies may be executed more than once, so they must be
/// free of side effects outside the transaction handle.
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync {
    /// Read a document, `Ok(None)` if it does not exist.
    async fn get(&self, path: &str) -> Result<Option<Document>>;

    /// Create or replace a document outside a transaction.
    async fn set(&self, path: &str, document: Document) -> Result<()>;

    /// Run a query against a collection.
    async fn query(&self, query: &Query) -> Result<Vec<Document>>;

    /// Run `body` atomically, retrying it on write conflicts.
    async fn run_transaction<T, F>(&self, body: F) -> Result<T>
    where
        F: FnMut(&mut dyn DocumentTransaction) -> Result<T>;
}

/// Well-known document locations.
pub mod paths {
    /// Preferences document of a user.
    pub fn preferences(uid: &str) -> String {
        format!("users/{}/settings/preferences", uid)
    }

    /// Collection holding a user's diary records.
    pub fn diary(uid: &str) -> String {
        format!("users/{}/diary", uid)
    }

    /// One diary record.
    pub fn diary_record(uid: &str, id: &str) -> String {
        format!("{}/{}", diary(uid), id)
    }

    /// Facet aggregate document of a user.
    pub fn filter_data(uid: &str) -> String {
        format!("users/{}/filters/all", uid)
    }
}

/// Split a document path into `(collection, id)`.
///
/// Document paths have an even number of non-empty segments.
pub fn split_document_path(path: &str) -> Result<(&str, &str)> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 || segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
        return Err(DiaryError::InvalidInput(format!(
            "Not a document path: {}",
            path
        )));
    }
    match path.rsplit_once('/') {
        Some((collection, id)) => Ok((collection, id)),
        None => Err(DiaryError::InvalidInput(format!(
            "Not a document path: {}",
            path
        ))),
    }
}

/// Validate a collection path (odd number of non-empty segments).
pub fn validate_collection_path(path: &str) -> Result<()> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() % 2 != 1 || segments.iter().any(|s| s.is_empty()) {
        return Err(DiaryError::InvalidInput(format!(
            "Not a collection path: {}",
            path
        )));
    }
    Ok(())
}

/// Serialize a value into a top-level document.
pub fn to_document<T: serde::Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(DiaryError::Validation(format!(
            "Document must be a JSON object, got {}",
            other
        ))),
    }
}

/// Deserialize a document into a typed value.
pub fn from_document<T: serde::de::DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(document))?)
}
