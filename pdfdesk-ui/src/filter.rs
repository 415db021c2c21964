//! Filter Controller
//!
//! Every filter change is a round trip: the server returns the matching
//! subset and the store is replaced with it. Nothing is filtered client-side.

use crate::api::RemoteStore;
use crate::error::Result;
use crate::store::{self, SharedStore};
use chrono::Utc;
use pdfdesk_common::events::{EventBus, UiEvent};
use pdfdesk_common::{Record, SelectionFilter};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

pub const LOAD_FAILED_ALERT: &str = "Error loading files.";

pub struct FilterController {
    remote: Arc<dyn RemoteStore>,
    store: SharedStore,
    events: Arc<EventBus>,
    current: Mutex<SelectionFilter>,
}

impl FilterController {
    pub fn new(remote: Arc<dyn RemoteStore>, store: SharedStore, events: Arc<EventBus>) -> Self {
        Self {
            remote,
            store,
            events,
            current: Mutex::new(SelectionFilter::Unset),
        }
    }

    /// The single active filter
    pub fn current(&self) -> SelectionFilter {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `filter` active and refetch the collection scoped to it
    ///
    /// The filter switches before the request is sent; on failure the
    /// previous collection stays displayed.
    pub async fn set_filter(&self, filter: SelectionFilter) -> Result<Vec<Record>> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = filter;
        self.refresh().await
    }

    /// Refetch the collection for the active filter
    pub async fn refresh(&self) -> Result<Vec<Record>> {
        let filter = self.current();
        match store::load(&self.store, &*self.remote, filter).await {
            Ok(records) => {
                self.events.emit_lossy(UiEvent::RecordsReplaced {
                    filter,
                    count: records.len(),
                    timestamp: Utc::now(),
                });
                Ok(records)
            }
            Err(e) => {
                warn!(%filter, error = %e, "Refetch failed");
                self.events.alert(LOAD_FAILED_ALERT);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use crate::test_support::{record, Call, FakeRemote};

    fn setup() -> (Arc<FakeRemote>, SharedStore, FilterController) {
        let remote = Arc::new(FakeRemote::with_records(vec![
            record(1, "a", true),
            record(2, "b", false),
            record(3, "c", true),
        ]));
        let store = RecordStore::new().shared();
        let controller = FilterController::new(remote.clone(), store.clone(), Arc::new(EventBus::new(10)));
        (remote, store, controller)
    }

    #[tokio::test]
    async fn test_filter_cycle_refetches_each_scope() {
        let (remote, store, controller) = setup();

        controller.set_filter(SelectionFilter::Unset).await.unwrap();
        assert_eq!(store.read().await.len(), 3);

        controller.set_filter(SelectionFilter::Selected).await.unwrap();
        assert_eq!(
            store.read().await.records(),
            &[record(1, "a", true), record(3, "c", true)]
        );

        controller.set_filter(SelectionFilter::NotSelected).await.unwrap();
        assert_eq!(store.read().await.records(), &[record(2, "b", false)]);

        controller.set_filter(SelectionFilter::Unset).await.unwrap();
        assert_eq!(store.read().await.len(), 3);

        assert_eq!(
            remote.calls(),
            vec![
                Call::List(SelectionFilter::Unset),
                Call::List(SelectionFilter::Selected),
                Call::List(SelectionFilter::NotSelected),
                Call::List(SelectionFilter::Unset),
            ]
        );
        assert_eq!(controller.current(), SelectionFilter::Unset);
    }

    #[tokio::test]
    async fn test_refetch_is_wholesale_replace() {
        let (remote, store, controller) = setup();
        controller.set_filter(SelectionFilter::Selected).await.unwrap();

        // Server state changes between fetches; the store mirrors the new response only
        remote.set_server_records(vec![record(7, "new", true)]);
        controller.set_filter(SelectionFilter::Selected).await.unwrap();

        assert_eq!(store.read().await.records(), &[record(7, "new", true)]);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_collection_and_switches_filter() {
        let (remote, store, controller) = setup();
        controller.set_filter(SelectionFilter::Unset).await.unwrap();
        remote.fail_list(true);

        assert!(controller.set_filter(SelectionFilter::Selected).await.is_err());

        assert_eq!(store.read().await.len(), 3);
        assert_eq!(controller.current(), SelectionFilter::Selected);
    }
}
