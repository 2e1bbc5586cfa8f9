//! Document-store seam consumed by the registry loader.
//!
//! The authoritative clan collection lives in an external document store.
//! The registry only needs two operations from it, a full id listing and a
//! projected bulk read, so that is the whole trait. Hosts plug in their
//! production client; [`InMemoryDocumentStore`] covers tests and development.

mod memory;

use std::fmt;

use async_trait::async_trait;

use crate::clan::RawClanDocument;

pub use memory::InMemoryDocumentStore;

/// Error type for document-store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend rejected or failed the call.
    Backend(String),
    /// A document could not be decoded into the projected shape.
    Decode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
            StoreError::Decode(msg) => write!(f, "document decode error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Client contract for the external document store holding the clan
/// collection.
///
/// Implementations must tolerate `bulk_read` batches of up to 1000 ids and
/// guarantee nothing about ordering across calls.
#[async_trait]
pub trait ClanStore: Send + Sync + 'static {
    /// List the complete set of document ids in a collection.
    async fn list_document_ids(
        &self,
        collection: &str,
        parent_path: &str,
    ) -> Result<Vec<String>, StoreError>;

    /// Read a batch of documents by id with the given field projection.
    ///
    /// Ids that resolve to no document are skipped, not errors.
    async fn bulk_read(
        &self,
        collection: &str,
        parent_path: &str,
        ids: &[String],
        projection: &[&str],
    ) -> Result<Vec<RawClanDocument>, StoreError>;
}
