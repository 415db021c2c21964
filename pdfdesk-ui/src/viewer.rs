//! Viewer links
//!
//! Stored files are private; viewing one needs a short-lived presigned URL.
//! When the service cannot produce one, the record's raw file reference is
//! used instead.

use crate::api::RemoteStore;
use crate::error::{ControllerError, Result};
use crate::store::SharedStore;
use pdfdesk_common::RecordId;
use std::sync::Arc;
use tracing::warn;

/// Where a viewer link came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerLink {
    /// Temporary link issued by the service
    Presigned(String),
    /// The record's raw `file` reference
    Fallback(String),
}

impl ViewerLink {
    pub fn url(&self) -> &str {
        match self {
            ViewerLink::Presigned(url) | ViewerLink::Fallback(url) => url,
        }
    }
}

pub struct ViewerLinks {
    remote: Arc<dyn RemoteStore>,
    store: SharedStore,
}

impl ViewerLinks {
    pub fn new(remote: Arc<dyn RemoteStore>, store: SharedStore) -> Self {
        Self { remote, store }
    }

    /// Link for viewing the record `id`
    ///
    /// Fails only when the record is not in the store.
    pub async fn resolve(&self, id: RecordId) -> Result<ViewerLink> {
        let fallback = self
            .store
            .read()
            .await
            .get(id)
            .map(|r| r.file.clone())
            .ok_or(ControllerError::NotFound(id))?;

        match self.remote.presigned_url(id).await {
            Ok(url) => Ok(ViewerLink::Presigned(url)),
            Err(e) => {
                warn!(%id, error = %e, "Presigned URL unavailable, using raw file reference");
                Ok(ViewerLink::Fallback(fallback))
            }
        }
    }
}
