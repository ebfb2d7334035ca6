use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::database::{self, DatabaseConfig, OPERATION_TIMEOUT};
use crate::store::{DocumentStore, StoreConnector, StoreError, UpsertOutcome, COLLECTION_NAME};

pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
    operation_timeout: Duration,
}

impl MongoStore {
    /// Builds the client. No I/O happens until the first operation.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let client = database::connect(config).await?;
        let collection = client.database(&config.name).collection(COLLECTION_NAME);

        Ok(Self {
            client,
            collection,
            operation_timeout: OPERATION_TIMEOUT,
        })
    }

    /// Connects and pings, so an unreachable server is reported here.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let store = Self::connect(config).await?;
        if let Err(e) = store.ping().await {
            store.close().await;
            return Err(e);
        }
        Ok(store)
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, mongodb::error::Error>>,
    {
        match tokio::time::timeout(self.operation_timeout, op).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.operation_timeout)),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let admin = self.client.database("admin");
        self.bounded(async { admin.run_command(doc! { "ping": 1 }).await })
            .await
            .map(|_| ())
    }

    async fn find_by_language(&self, language: &str) -> Result<Option<Document>, StoreError> {
        self.bounded(async {
            self.collection
                .find_one(doc! { "language": language })
                .await
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        self.bounded(async {
            let cursor = self.collection.find(doc! {}).await?;
            cursor.try_collect().await
        })
        .await
    }

    async fn upsert_by_language(
        &self,
        language: &str,
        fields: Document,
    ) -> Result<UpsertOutcome, StoreError> {
        let result = self
            .bounded(async {
                self.collection
                    .update_one(doc! { "language": language }, doc! { "$set": fields })
                    .upsert(true)
                    .await
            })
            .await?;

        Ok(if result.upserted_id.is_some() {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.bounded(async { self.collection.count_documents(doc! {}).await })
            .await
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}

/// Opens real MongoDB connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoConnector;

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self, target: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let store = MongoStore::connect(target).await?;
        Ok(Arc::new(store))
    }
}
