//! Record Store
//!
//! In-memory ordered collection of document records; the single source of
//! truth for rendering. Edits are applied here immediately (optimistically)
//! and are never rolled back if the remote write later fails.

use crate::api::{ApiResult, RemoteStore};
use crate::error::{ControllerError, Result, ValidationError};
use pdfdesk_common::{FieldValue, Record, RecordField, RecordId, SelectionFilter};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Store shared between the controller components
pub type SharedStore = Arc<RwLock<RecordStore>>;

#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Records in display order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Replace the whole collection
    pub fn replace_all(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    /// Set `field` on the record with `id` and return the updated snapshot
    ///
    /// Fails with `NotFound` for an unknown id (nothing is inserted) and with
    /// a `FieldType` validation error when the value kind does not match.
    pub fn apply_edit(&mut self, id: RecordId, field: RecordField, value: FieldValue) -> Result<Record> {
        if !field.accepts(&value) {
            return Err(ValidationError::FieldType {
                field,
                expected: field.kind(),
            }
            .into());
        }

        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ControllerError::NotFound(id))?;
        record.apply(field, value)?;
        Ok(record.clone())
    }

    /// Remove the record with `id`; no-op if absent
    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    pub fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    /// First record with `selected == true`
    ///
    /// Selection is not unique; when several records are selected the first
    /// in display order wins.
    pub fn first_selected(&self) -> Option<&Record> {
        self.records.iter().find(|r| r.selected)
    }

    pub fn has_selected(&self) -> bool {
        self.first_selected().is_some()
    }
}

/// Fetch the collection for `filter` and replace the store wholesale
///
/// The store lock is only taken after the response arrives; on failure the
/// current collection is left untouched.
pub async fn load(store: &SharedStore, remote: &dyn RemoteStore, filter: SelectionFilter) -> ApiResult<Vec<Record>> {
    let records = remote.list(filter).await?;
    store.write().await.replace_all(records.clone());
    tracing::info!(%filter, count = records.len(), "Record store replaced");
    Ok(records)
}
