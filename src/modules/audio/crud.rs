use bson::Document;

use crate::modules::audio::model::{AudioRecord, Language, StoredAudio};
use crate::store::{strip_id, DocumentStore, StoreError, UpsertOutcome};

pub struct AudioCrud<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AudioCrud<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    pub async fn find_by_language(&self, language: Language) -> Result<Option<StoredAudio>, StoreError> {
        match self.store.find_by_language(language.as_str()).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Every stored document as-is, minus its store identifier.
    pub async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        let documents = self.store.find_all().await?;
        Ok(documents.into_iter().map(strip_id).collect())
    }

    pub async fn upsert(&self, record: &AudioRecord) -> Result<UpsertOutcome, StoreError> {
        let fields = strip_id(bson::to_document(record)?);
        self.store.upsert_by_language(&record.language, fields).await
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        self.store.count().await
    }
}
