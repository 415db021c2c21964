//! Write Coalescer
//!
//! Collapses bursts of edits to one record into a single remote write sent
//! after a quiet interval. The remote update endpoint replaces the whole
//! record, so what gets sent is always the full record snapshot from the most
//! recent edit, never just the changed field.
//!
//! Each record id owns at most one armed timer: a spawned task sleeping for
//! the quiet interval. Scheduling again for the same id aborts that task and
//! arms a new one. Once a timer fires its write is in flight and can no
//! longer be cancelled; a later edit arms a fresh timer alongside it.

use crate::api::RemoteStore;
use chrono::Utc;
use pdfdesk_common::events::{EventBus, UiEvent};
use pdfdesk_common::{Record, RecordField, RecordId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Armed timer for one record
struct PendingWrite {
    /// Distinguishes this timer from a later one for the same record
    generation: u64,
    snapshot: Record,
    field: RecordField,
    handle: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<RecordId, PendingWrite>>>;

pub struct WriteCoalescer {
    remote: Arc<dyn RemoteStore>,
    events: Arc<EventBus>,
    quiet: Duration,
    pending: PendingMap,
    generation: AtomicU64,
}

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<RecordId, PendingWrite>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

impl WriteCoalescer {
    pub fn new(remote: Arc<dyn RemoteStore>, events: Arc<EventBus>, quiet: Duration) -> Self {
        Self {
            remote,
            events,
            quiet,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    /// (Re)arm the timer for `record.id` with this snapshot
    ///
    /// Supersedes any armed timer for the same record. Timers of other
    /// records are not touched.
    pub fn schedule(&self, record: Record, changed_field: RecordField) {
        let id = record.id;
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + self.quiet;

        let mut pending = lock(&self.pending);
        if let Some(previous) = pending.remove(&id) {
            previous.handle.abort();
            debug!(%id, field = %previous.field, "Superseded pending write");
        }

        let handle = tokio::spawn(fire_after(
            deadline,
            id,
            generation,
            Arc::clone(&self.pending),
            Arc::clone(&self.remote),
            Arc::clone(&self.events),
        ));

        pending.insert(
            id,
            PendingWrite {
                generation,
                snapshot: record,
                field: changed_field,
                handle,
            },
        );
        debug!(%id, field = %changed_field, quiet_ms = self.quiet.as_millis() as u64, "Write scheduled");
    }

    /// Number of records with an armed timer
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_pending(&self, id: RecordId) -> bool {
        lock(&self.pending).contains_key(&id)
    }

    /// Send every pending write now and wait for the sends to finish
    pub async fn flush(&self) {
        let drained: Vec<PendingWrite> = lock(&self.pending).drain().map(|(_, p)| p).collect();
        if drained.is_empty() {
            return;
        }

        info!(count = drained.len(), "Flushing pending writes");
        for write in drained {
            write.handle.abort();
            send(write.snapshot, &*self.remote, &self.events).await;
        }
    }
}

impl Drop for WriteCoalescer {
    fn drop(&mut self) {
        for (_, write) in lock(&self.pending).drain() {
            write.handle.abort();
        }
    }
}

/// Timer task body: sleep until `deadline`, claim the slot, then send
///
/// The deadline is fixed when the edit is scheduled, so a task that is
/// polled late does not push its write back.
async fn fire_after(
    deadline: Instant,
    id: RecordId,
    generation: u64,
    pending: PendingMap,
    remote: Arc<dyn RemoteStore>,
    events: Arc<EventBus>,
) {
    tokio::time::sleep_until(deadline).await;

    // Only the most recent timer for this id may claim the slot
    let snapshot = {
        let mut pending = lock(&pending);
        match pending.get(&id) {
            Some(write) if write.generation == generation => pending.remove(&id).map(|w| w.snapshot),
            _ => None,
        }
    };

    if let Some(snapshot) = snapshot {
        send(snapshot, &*remote, &events).await;
    }
}

/// Write one full snapshot; failures are reported but never reverted locally
async fn send(snapshot: Record, remote: &dyn RemoteStore, events: &EventBus) {
    let id = snapshot.id;
    match remote.replace(&snapshot).await {
        Ok(()) => {
            debug!(%id, "Coalesced write synced");
            events.emit_lossy(UiEvent::WriteSynced {
                id,
                timestamp: Utc::now(),
            });
        }
        Err(e) => {
            warn!(%id, error = %e, "Coalesced write failed; local edit kept");
            events.emit_lossy(UiEvent::WriteFailed {
                id,
                message: e.to_string(),
                timestamp: Utc::now(),
            });
        }
    }
}
