//! Q&A Session Controller
//!
//! Runs one question at a time against the first selected record:
//!
//! ```text
//! Idle -> Validating -> AwaitingResponse -> { Answered | Failed } -> Idle
//!              |
//!              +--> Idle   (blank question / nothing selected)
//! ```
//!
//! A submission holds a [`Flight`] guard for its whole duration. Dropping the
//! guard returns the session to `Idle` with `loading == false`, whichever
//! path ended the submission (success, error, or the future being dropped).

use crate::api::RemoteStore;
use crate::error::{ControllerError, Result, ValidationError};
use crate::store::SharedStore;
use chrono::Utc;
use pdfdesk_common::events::{EventBus, UiEvent};
use pdfdesk_common::models::QaPhase;
use pdfdesk_common::RecordId;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

pub const EMPTY_QUESTION_ALERT: &str = "Please enter a question.";
pub const NO_SELECTION_ALERT: &str = "Please select a PDF file first.";
pub const SERVER_ERROR_ALERT: &str = "Error getting answer from the server.";
pub const CONNECTION_ERROR_ALERT: &str = "Error connecting to the server.";

/// Observable Q&A state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QaSnapshot {
    /// Text of the latest submission
    pub question: String,
    /// Latest answer; empty while a request is in flight or after a failure
    pub answer: String,
    pub phase: QaPhase,
    /// True exactly while a request is awaiting its response
    pub loading: bool,
}

pub struct QaController {
    remote: Arc<dyn RemoteStore>,
    store: SharedStore,
    events: Arc<EventBus>,
    session: Mutex<QaSnapshot>,
}

impl QaController {
    pub fn new(remote: Arc<dyn RemoteStore>, store: SharedStore, events: Arc<EventBus>) -> Self {
        Self {
            remote,
            store,
            events,
            session: Mutex::new(QaSnapshot::default()),
        }
    }

    fn session(&self) -> MutexGuard<'_, QaSnapshot> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> QaSnapshot {
        self.session().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.session().loading
    }

    /// Whether a new question may be submitted
    pub fn can_submit(&self) -> bool {
        self.session().phase == QaPhase::Idle
    }

    /// Ask `question` about the first selected record
    ///
    /// Returns the decoded answer. Validation failures raise an alert and
    /// make no network call; a submission while another is in progress fails
    /// with `Busy` and changes nothing.
    pub async fn submit(&self, question: &str) -> Result<String> {
        let mut flight = Flight::begin(self, question)?;

        if question.trim().is_empty() {
            self.events.alert(EMPTY_QUESTION_ALERT);
            return Err(ValidationError::EmptyQuestion.into());
        }

        let target: Option<RecordId> = self.store.read().await.first_selected().map(|r| r.id);
        let Some(id) = target else {
            self.events.alert(NO_SELECTION_ALERT);
            return Err(ValidationError::NoRecordSelected.into());
        };

        flight.await_response();
        info!(%id, "Question submitted");

        match self.remote.ask(id, question).await {
            Ok(reply) => {
                let answer = reply.into_answer();
                flight.finish(QaPhase::Answered, Some(answer.clone()));
                info!(%id, answer_len = answer.len(), "Question answered");
                self.events.emit_lossy(UiEvent::QaAnswered {
                    record_id: id,
                    answer: answer.clone(),
                    timestamp: Utc::now(),
                });
                Ok(answer)
            }
            Err(e) => {
                warn!(%id, error = %e, "Question failed");
                flight.finish(QaPhase::Failed, None);
                // Only a non-success status counts as a server answer;
                // an unreadable body is reported like a broken connection
                self.events.alert(if e.is_status() {
                    SERVER_ERROR_ALERT
                } else {
                    CONNECTION_ERROR_ALERT
                });
                Err(ControllerError::Api(e))
            }
        }
    }

    fn transition(&self, session: &mut QaSnapshot, next: QaPhase) {
        let old = session.phase;
        if old == next {
            return;
        }
        debug_assert!(old.can_transition_to(next), "invalid Q&A transition {} -> {}", old, next);
        session.phase = next;
        debug!(from = %old, to = %next, "Q&A phase changed");
        self.events.emit_lossy(UiEvent::QaPhaseChanged {
            old_phase: old,
            new_phase: next,
            timestamp: Utc::now(),
        });
    }
}

/// Scoped ownership of the single Q&A slot
struct Flight<'a> {
    controller: &'a QaController,
}

impl<'a> Flight<'a> {
    /// `Idle -> Validating`, or `Busy` if a submission is already running
    fn begin(controller: &'a QaController, question: &str) -> Result<Self> {
        let mut session = controller.session();
        if session.phase != QaPhase::Idle {
            debug!(phase = %session.phase, "Submission rejected while busy");
            return Err(ControllerError::Busy);
        }
        session.question = question.to_string();
        controller.transition(&mut session, QaPhase::Validating);
        Ok(Self { controller })
    }

    /// `Validating -> AwaitingResponse`; clears the previous answer
    fn await_response(&mut self) {
        let mut session = self.controller.session();
        session.answer.clear();
        session.loading = true;
        self.controller.transition(&mut session, QaPhase::AwaitingResponse);
    }

    /// `AwaitingResponse -> Answered | Failed`
    fn finish(&mut self, phase: QaPhase, answer: Option<String>) {
        let mut session = self.controller.session();
        if let Some(answer) = answer {
            session.answer = answer;
        }
        session.loading = false;
        self.controller.transition(&mut session, phase);
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut session = self.controller.session();
        session.loading = false;
        self.controller.transition(&mut session, QaPhase::Idle);
    }
}
