//! Document access shared by the HTTP service and the migration utility.

use async_trait::async_trait;
use bson::Document;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::database::DatabaseConfig;

pub mod memory;
pub mod mongo;

pub const COLLECTION_NAME: &str = "audio_files";
pub const ID_FIELD: &str = "_id";
pub const LANGUAGE_FIELD: &str = "language";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Failed to decode document: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("Failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Database unreachable: {0}")]
    Unreachable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl UpsertOutcome {
    pub fn is_inserted(self) -> bool {
        matches!(self, UpsertOutcome::Inserted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Updated => "updated",
        }
    }
}

/// One collection of audio records, keyed logically by `language`.
///
/// Implementations must be safe to share between concurrent request handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Round-trip to the server; fails when it cannot be reached.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_by_language(&self, language: &str) -> Result<Option<Document>, StoreError>;

    /// Every document in read order, identifiers included.
    async fn find_all(&self) -> Result<Vec<Document>, StoreError>;

    /// `$set`s `fields` on the document whose `language` matches, creating it if absent.
    async fn upsert_by_language(
        &self,
        language: &str,
        fields: Document,
    ) -> Result<UpsertOutcome, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Releases the underlying connection. Never fails.
    async fn close(&self);
}

/// Opens a store for a configured target.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, target: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError>;
}

pub fn strip_id(mut document: Document) -> Document {
    document.remove(ID_FIELD);
    document
}
