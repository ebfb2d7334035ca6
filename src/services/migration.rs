//! One-shot copy of every audio record from a source database to a destination.
//!
//! Records are upserted one at a time, keyed by `language`, so re-running with
//! unchanged source data updates the same destination documents instead of
//! duplicating them. A failure at any step aborts the run; records already
//! written stay written.

use bson::Document;
use std::env;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::database::{database_name_from_env, DatabaseConfig, DEFAULT_URI};
use crate::store::{strip_id, DocumentStore, StoreConnector, StoreError, UpsertOutcome, LANGUAGE_FIELD};

pub const DEST_URI_VAR: &str = "DEST_MONGO_URI";
pub const MIGRATED_AT_FIELD: &str = "migrated_at";
pub const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Uninitialized,
    Connecting,
    Connected,
    Reading,
    Writing,
    Done,
    Failed,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MigrationState::Uninitialized => "uninitialized",
            MigrationState::Connecting => "connecting",
            MigrationState::Connected => "connected",
            MigrationState::Reading => "reading",
            MigrationState::Writing => "writing",
            MigrationState::Done => "done",
            MigrationState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("DEST_MONGO_URI environment variable not set")]
    MissingDestination,
    #[error("source record #{0} has no string `language` field")]
    MissingLanguage(usize),
    #[error("migration failed while {stage}: {source}")]
    Store {
        stage: MigrationState,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source: DatabaseConfig,
    pub destination: Option<DatabaseConfig>,
}

impl MigrationConfig {
    pub fn from_env() -> Self {
        let default_name = database_name_from_env();

        let source = DatabaseConfig::new(
            env::var("SOURCE_MONGO_URI").unwrap_or_else(|_| DEFAULT_URI.to_string()),
            env::var("SOURCE_DATABASE_NAME").unwrap_or_else(|_| default_name.clone()),
        );

        let destination = env::var(DEST_URI_VAR)
            .ok()
            .filter(|uri| !uri.trim().is_empty())
            .map(|uri| {
                DatabaseConfig::new(
                    uri,
                    env::var("DEST_DATABASE_NAME").unwrap_or_else(|_| default_name.clone()),
                )
            });

        Self { source, destination }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedRecord {
    pub language: String,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub records: Vec<MigratedRecord>,
    /// `None` when the source was empty and nothing was written.
    pub destination_count: Option<u64>,
}

impl MigrationReport {
    pub fn migrated(&self) -> usize {
        self.records.len()
    }

    pub fn is_noop(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug)]
pub enum MigrationOutcome {
    Cancelled,
    Completed(MigrationReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPreview {
    pub language: String,
    pub preview: String,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub records: Vec<RecordPreview>,
}

impl VerifyReport {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

pub struct Migrator<C> {
    connector: C,
    config: MigrationConfig,
    state: MigrationState,
}

impl<C: StoreConnector> Migrator<C> {
    pub fn new(connector: C, config: MigrationConfig) -> Self {
        Self {
            connector,
            config,
            state: MigrationState::Uninitialized,
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    /// Copies every source record into the destination. Nothing is touched
    /// unless `confirmed` is set.
    pub async fn migrate(&mut self, confirmed: bool) -> Result<MigrationOutcome, MigrationError> {
        if !confirmed {
            tracing::info!("Migration cancelled");
            return Ok(MigrationOutcome::Cancelled);
        }

        let destination = self.destination_config()?;

        let mut source_store: Option<Arc<dyn DocumentStore>> = None;
        let mut destination_store: Option<Arc<dyn DocumentStore>> = None;

        let result = self
            .copy_all(&destination, &mut source_store, &mut destination_store)
            .await;

        for store in [source_store, destination_store].into_iter().flatten() {
            store.close().await;
        }

        match result {
            Ok(report) => {
                self.transition(MigrationState::Done);
                Ok(MigrationOutcome::Completed(report))
            }
            Err(e) => {
                self.transition(MigrationState::Failed);
                tracing::error!(error = %e, "Migration failed");
                Err(e)
            }
        }
    }

    /// Reads the destination back without modifying it.
    pub async fn verify(&mut self) -> Result<VerifyReport, MigrationError> {
        let destination = self.destination_config()?;
        let mut destination_store: Option<Arc<dyn DocumentStore>> = None;

        let result = self.read_back(&destination, &mut destination_store).await;

        if let Some(store) = destination_store {
            store.close().await;
        }

        match result {
            Ok(report) => {
                self.transition(MigrationState::Done);
                Ok(report)
            }
            Err(e) => {
                self.transition(MigrationState::Failed);
                tracing::error!(error = %e, "Verification failed");
                Err(e)
            }
        }
    }

    /// Fails before any connection attempt when no destination is configured.
    fn destination_config(&mut self) -> Result<DatabaseConfig, MigrationError> {
        match self.config.destination.clone() {
            Some(destination) => Ok(destination),
            None => {
                self.transition(MigrationState::Failed);
                tracing::error!("Destination database not configured, set {}", DEST_URI_VAR);
                Err(MigrationError::MissingDestination)
            }
        }
    }

    async fn copy_all(
        &mut self,
        destination: &DatabaseConfig,
        source_slot: &mut Option<Arc<dyn DocumentStore>>,
        destination_slot: &mut Option<Arc<dyn DocumentStore>>,
    ) -> Result<MigrationReport, MigrationError> {
        let source_config = self.config.source.clone();
        let source = self.open(&source_config, source_slot).await?;
        let target = self.open(destination, destination_slot).await?;
        self.transition(MigrationState::Connected);

        self.transition(MigrationState::Reading);
        let documents = source.find_all().await.map_err(|e| self.failed(e))?;
        tracing::info!(count = documents.len(), "Found records in source database");

        if documents.is_empty() {
            tracing::warn!("No data found in source database");
            return Ok(MigrationReport::default());
        }

        self.transition(MigrationState::Writing);
        let mut records = Vec::with_capacity(documents.len());

        for (index, document) in documents.into_iter().enumerate() {
            let (language, fields) = prepare_for_destination(index, document)?;

            let outcome = target
                .upsert_by_language(&language, fields)
                .await
                .map_err(|e| self.failed(e))?;

            tracing::info!(%language, outcome = outcome.as_str(), "Migrated record");
            records.push(MigratedRecord { language, outcome });
        }

        let destination_count = target.count().await.map_err(|e| self.failed(e))?;
        tracing::info!(
            migrated = records.len(),
            destination_count,
            "Migration completed"
        );

        Ok(MigrationReport {
            records,
            destination_count: Some(destination_count),
        })
    }

    async fn read_back(
        &mut self,
        destination: &DatabaseConfig,
        slot: &mut Option<Arc<dyn DocumentStore>>,
    ) -> Result<VerifyReport, MigrationError> {
        let target = self.open(destination, slot).await?;
        self.transition(MigrationState::Connected);

        self.transition(MigrationState::Reading);
        let documents = target.find_all().await.map_err(|e| self.failed(e))?;

        let records = documents
            .into_iter()
            .map(strip_id)
            .map(|d| RecordPreview {
                language: d.get_str(LANGUAGE_FIELD).unwrap_or_default().to_string(),
                preview: text_preview(d.get_str("text").ok()),
            })
            .collect();

        Ok(VerifyReport { records })
    }

    /// Connects and probes; the handle lands in `slot` before the probe so
    /// cleanup can release it if the probe fails.
    async fn open(
        &mut self,
        target: &DatabaseConfig,
        slot: &mut Option<Arc<dyn DocumentStore>>,
    ) -> Result<Arc<dyn DocumentStore>, MigrationError> {
        self.transition(MigrationState::Connecting);
        tracing::info!(uri = %target.redacted_uri(), database = %target.name, "Connecting");

        let store = self
            .connector
            .connect(target)
            .await
            .map_err(|e| self.failed(e))?;
        *slot = Some(store.clone());

        store.ping().await.map_err(|e| self.failed(e))?;
        tracing::info!(database = %target.name, "Connected");

        Ok(store)
    }

    fn failed(&self, source: StoreError) -> MigrationError {
        MigrationError::Store {
            stage: self.state,
            source,
        }
    }

    fn transition(&mut self, next: MigrationState) {
        tracing::debug!(from = %self.state, to = %next, "migration state");
        self.state = next;
    }
}

/// Drops the source identifier and stamps the migration time.
fn prepare_for_destination(index: usize, document: Document) -> Result<(String, Document), MigrationError> {
    let mut fields = strip_id(document);
    let language = fields
        .get_str(LANGUAGE_FIELD)
        .map_err(|_| MigrationError::MissingLanguage(index))?
        .to_string();
    fields.insert(MIGRATED_AT_FIELD, bson::DateTime::now());
    Ok((language, fields))
}

pub fn text_preview(text: Option<&str>) -> String {
    let Some(text) = text else {
        return "No text".to_string();
    };

    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};

    #[test]
    fn preview_truncates_long_text_by_characters() {
        let arabic = "ت".repeat(60);
        let preview = text_preview(Some(arabic.as_str()));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn preview_keeps_short_text_and_marks_missing() {
        assert_eq!(text_preview(Some("hello")), "hello");
        assert_eq!(text_preview(None), "No text");
    }

    #[test]
    fn prepared_record_loses_id_and_gains_migration_stamp() {
        let document = doc! { "_id": ObjectId::new(), "language": "english", "audio_url": "/a.mp3" };
        let (language, fields) = prepare_for_destination(0, document).unwrap();

        assert_eq!(language, "english");
        assert!(!fields.contains_key("_id"));
        assert!(fields.get_datetime(MIGRATED_AT_FIELD).is_ok());
    }

    #[test]
    fn record_without_language_is_rejected() {
        let result = prepare_for_destination(3, doc! { "audio_url": "/a.mp3" });
        assert!(matches!(result, Err(MigrationError::MissingLanguage(3))));
    }
}
