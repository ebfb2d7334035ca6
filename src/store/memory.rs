//! In-process store with the same upsert semantics as the MongoDB one.

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::database::DatabaseConfig;
use crate::store::{DocumentStore, StoreConnector, StoreError, UpsertOutcome, ID_FIELD, LANGUAGE_FIELD};

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<Document>>,
    unreachable: bool,
    writes: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose server never answers: every call fails.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        let documents = documents
            .into_iter()
            .map(|mut d| {
                if !d.contains_key(ID_FIELD) {
                    d.insert(ID_FIELD, ObjectId::new());
                }
                d
            })
            .collect();

        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    pub fn documents(&self) -> Vec<Document> {
        self.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Document>> {
        // a poisoned lock still holds consistent documents
        self.documents.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.unreachable {
            return Err(StoreError::Unreachable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reachable()
    }

    async fn find_by_language(&self, language: &str) -> Result<Option<Document>, StoreError> {
        self.check_reachable()?;
        Ok(self
            .lock()
            .iter()
            .find(|d| d.get_str(LANGUAGE_FIELD).ok() == Some(language))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        self.check_reachable()?;
        Ok(self.documents())
    }

    async fn upsert_by_language(
        &self,
        language: &str,
        fields: Document,
    ) -> Result<UpsertOutcome, StoreError> {
        self.check_reachable()?;
        let mut documents = self.lock();
        self.writes.fetch_add(1, Ordering::SeqCst);

        if let Some(existing) = documents
            .iter_mut()
            .find(|d| d.get_str(LANGUAGE_FIELD).ok() == Some(language))
        {
            for (key, value) in fields {
                if key != ID_FIELD {
                    existing.insert(key, value);
                }
            }
            return Ok(UpsertOutcome::Updated);
        }

        let mut created = Document::new();
        created.insert(ID_FIELD, ObjectId::new());
        created.insert(LANGUAGE_FIELD, language);
        for (key, value) in fields {
            if key != ID_FIELD {
                created.insert(key, value);
            }
        }
        documents.push(created);

        Ok(UpsertOutcome::Inserted)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.check_reachable()?;
        Ok(self.lock().len() as u64)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Resolves connection strings to registered in-memory stores.
#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
    stores: HashMap<String, Arc<MemoryStore>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, uri: impl Into<String>, store: Arc<MemoryStore>) -> Self {
        self.stores.insert(uri.into(), store);
        self
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn connect(&self, target: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
        match self.stores.get(&target.uri) {
            Some(store) => Ok(store.clone() as Arc<dyn DocumentStore>),
            None => Err(StoreError::Unreachable(format!(
                "no server at {}",
                target.redacted_uri()
            ))),
        }
    }
}
