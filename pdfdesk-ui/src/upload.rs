//! Upload Pipeline
//!
//! Holds one locally chosen file until it is submitted as a multi-part
//! payload. A successful upload appends the created record to the store and
//! clears the selection, so submitting again needs a new file.

use crate::api::RemoteStore;
use crate::error::{ControllerError, Result, ValidationError};
use crate::store::SharedStore;
use chrono::Utc;
use pdfdesk_common::events::{EventBus, UiEvent};
use pdfdesk_common::Record;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

pub const NO_FILE_ALERT: &str = "Please select file to load.";
pub const UPLOAD_FAILED_ALERT: &str = "Error loading file.";

/// A file chosen for upload, read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl PendingFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            content,
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: &Path) -> pdfdesk_common::Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| pdfdesk_common::Error::InvalidInput(format!("not a file path: {}", path.display())))?
            .to_string();
        let content = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, content))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let is_pdf = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

pub struct UploadPipeline {
    remote: Arc<dyn RemoteStore>,
    store: SharedStore,
    events: Arc<EventBus>,
    pending: Mutex<Option<PendingFile>>,
}

impl UploadPipeline {
    pub fn new(remote: Arc<dyn RemoteStore>, store: SharedStore, events: Arc<EventBus>) -> Self {
        Self {
            remote,
            store,
            events,
            pending: Mutex::new(None),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingFile>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remember `file` as the one to upload next, replacing any earlier choice
    pub fn select(&self, file: PendingFile) {
        info!(file_name = %file.file_name, size = file.content.len(), "File selected for upload");
        *self.pending() = Some(file);
    }

    pub fn selected_file_name(&self) -> Option<String> {
        self.pending().as_ref().map(|f| f.file_name.clone())
    }

    /// Upload the selected file and append the created record
    ///
    /// On failure the selection is kept and the store is not touched.
    pub async fn submit(&self) -> Result<Record> {
        let selected = self.pending().clone();
        let file = match selected {
            Some(file) => file,
            None => {
                self.events.alert(NO_FILE_ALERT);
                return Err(ValidationError::NoFileSelected.into());
            }
        };

        let record = match self.remote.upload(&file).await {
            Ok(record) => record,
            Err(e) => {
                warn!(file_name = %file.file_name, error = %e, "Upload failed");
                self.events.alert(UPLOAD_FAILED_ALERT);
                return Err(ControllerError::UploadFailed(e));
            }
        };

        {
            let mut pending = self.pending();
            // A file chosen while the upload was in flight stays selected
            if pending.as_ref() == Some(&file) {
                *pending = None;
            }
        }

        self.store.write().await.append(record.clone());
        info!(id = %record.id, name = %record.name, "Uploaded record appended");
        self.events.emit_lossy(UiEvent::RecordAppended {
            record: record.clone(),
            timestamp: Utc::now(),
        });
        Ok(record)
    }
}
