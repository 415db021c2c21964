//! Deletion Handler
//!
//! Removal is not optimistic: the record stays visible until the remote
//! confirms the delete, so a record is never shown as gone while its backing
//! data still exists.

use crate::api::RemoteStore;
use crate::error::{ControllerError, Result};
use crate::store::SharedStore;
use chrono::Utc;
use pdfdesk_common::events::{EventBus, UiEvent};
use pdfdesk_common::RecordId;
use std::sync::Arc;
use tracing::{info, warn};

pub const DELETE_FAILED_ALERT: &str = "Error deleting file.";

pub struct DeletionHandler {
    remote: Arc<dyn RemoteStore>,
    store: SharedStore,
    events: Arc<EventBus>,
}

impl DeletionHandler {
    pub fn new(remote: Arc<dyn RemoteStore>, store: SharedStore, events: Arc<EventBus>) -> Self {
        Self { remote, store, events }
    }

    /// Delete remotely, then remove locally on success
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        if let Err(e) = self.remote.delete(id).await {
            warn!(%id, error = %e, "Remote delete failed; record kept");
            self.events.alert(DELETE_FAILED_ALERT);
            return Err(ControllerError::DeleteFailed(e));
        }

        let removed = self.store.write().await.remove(id);
        info!(%id, was_displayed = removed.is_some(), "Record deleted");
        self.events.emit_lossy(UiEvent::RecordRemoved {
            id,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
