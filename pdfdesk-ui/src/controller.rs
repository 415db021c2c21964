//! Document controller
//!
//! Wires the record store, write coalescer, filter, upload, deletion, Q&A
//! and viewer components around one shared store, one remote and one event
//! bus. This is the surface a renderer drives.

use crate::api::{HttpRemote, RemoteStore};
use crate::coalescer::WriteCoalescer;
use crate::deletion::DeletionHandler;
use crate::error::Result;
use crate::filter::FilterController;
use crate::qa::{QaController, QaSnapshot};
use crate::store::{RecordStore, SharedStore};
use crate::upload::{PendingFile, UploadPipeline};
use crate::viewer::{ViewerLink, ViewerLinks};
use chrono::Utc;
use pdfdesk_common::config::ClientConfig;
use pdfdesk_common::events::{EventBus, UiEvent};
use pdfdesk_common::{FieldValue, Record, RecordField, RecordId, SelectionFilter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub struct DocumentController {
    store: SharedStore,
    events: Arc<EventBus>,
    coalescer: WriteCoalescer,
    filter: FilterController,
    uploads: UploadPipeline,
    deletions: DeletionHandler,
    qa: QaController,
    viewer: ViewerLinks,
    initialized: AtomicBool,
}

impl DocumentController {
    pub fn new(remote: Arc<dyn RemoteStore>, config: &ClientConfig) -> Self {
        let store = RecordStore::new().shared();
        let events = Arc::new(EventBus::new(config.event_capacity));

        Self {
            coalescer: WriteCoalescer::new(remote.clone(), events.clone(), config.write_quiet),
            filter: FilterController::new(remote.clone(), store.clone(), events.clone()),
            uploads: UploadPipeline::new(remote.clone(), store.clone(), events.clone()),
            deletions: DeletionHandler::new(remote.clone(), store.clone(), events.clone()),
            qa: QaController::new(remote.clone(), store.clone(), events.clone()),
            viewer: ViewerLinks::new(remote, store.clone()),
            store,
            events,
            initialized: AtomicBool::new(false),
        }
    }

    /// Controller backed by the HTTP service at `config.api_url`
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let remote = HttpRemote::new(config.api_url.clone())?;
        info!(api_url = %config.api_url, "Document controller connected");
        Ok(Self::new(Arc::new(remote), config))
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    /// First, unfiltered load; later calls return the displayed collection
    pub async fn init(&self) -> Result<Vec<Record>> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(self.records().await);
        }
        self.filter.set_filter(SelectionFilter::Unset).await
    }

    /// Displayed records, in order
    pub async fn records(&self) -> Vec<Record> {
        self.store.read().await.records().to_vec()
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    /// Edit one field locally and schedule the coalesced remote write
    ///
    /// The store changes before this returns; the write follows after the
    /// quiet interval. A failed write is reported as `WriteFailed` and the
    /// local edit is kept.
    pub async fn edit(&self, id: RecordId, field: RecordField, value: FieldValue) -> Result<Record> {
        let updated = self.store.write().await.apply_edit(id, field, value);
        let record = match updated {
            Ok(record) => record,
            Err(e) => {
                warn!(%id, %field, error = %e, "Edit rejected");
                return Err(e);
            }
        };

        self.coalescer.schedule(record.clone(), field);
        self.events.emit_lossy(UiEvent::RecordUpdated {
            record: record.clone(),
            field,
            timestamp: Utc::now(),
        });
        Ok(record)
    }

    pub async fn rename(&self, id: RecordId, name: impl Into<String>) -> Result<Record> {
        self.edit(id, RecordField::Name, FieldValue::Text(name.into())).await
    }

    pub async fn set_selected(&self, id: RecordId, selected: bool) -> Result<Record> {
        self.edit(id, RecordField::Selected, FieldValue::Flag(selected)).await
    }

    /// Send pending coalesced writes now
    pub async fn flush_writes(&self) {
        self.coalescer.flush().await;
    }

    pub fn pending_writes(&self) -> usize {
        self.coalescer.pending_count()
    }

    /// Active filter, for highlighting
    pub fn filter(&self) -> SelectionFilter {
        self.filter.current()
    }

    pub async fn set_filter(&self, filter: SelectionFilter) -> Result<Vec<Record>> {
        self.filter.set_filter(filter).await
    }

    pub fn select_file(&self, file: PendingFile) {
        self.uploads.select(file);
    }

    pub async fn upload(&self) -> Result<Record> {
        self.uploads.submit().await
    }

    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.deletions.delete(id).await
    }

    /// Whether the Q&A surface applies (some record is selected)
    pub async fn has_selected(&self) -> bool {
        self.store.read().await.has_selected()
    }

    pub async fn ask(&self, question: &str) -> Result<String> {
        self.qa.submit(question).await
    }

    pub fn qa(&self) -> QaSnapshot {
        self.qa.snapshot()
    }

    pub fn can_ask(&self) -> bool {
        self.qa.can_submit()
    }

    pub async fn viewer_url(&self, id: RecordId) -> Result<ViewerLink> {
        self.viewer.resolve(id).await
    }
}
