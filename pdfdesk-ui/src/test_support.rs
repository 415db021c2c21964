//! In-memory [`RemoteStore`] double for unit tests

use crate::api::{ApiError, ApiResult, QaReply, RemoteStore};
use crate::upload::PendingFile;
use async_trait::async_trait;
use pdfdesk_common::{Record, RecordId, SelectionFilter};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn record(id: i64, name: &str, selected: bool) -> Record {
    Record {
        id: RecordId(id),
        name: name.to_string(),
        file: format!("https://bucket.example/{}.pdf", id),
        selected,
    }
}

/// One call observed by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(SelectionFilter),
    Replace(Record),
    Delete(RecordId),
    Upload(String),
    Presigned(RecordId),
    Ask(RecordId, String),
}

/// Remote double holding its own record table
///
/// Behaves like the real service: `list` filters server-side, `replace`
/// overwrites the whole row, `upload` assigns the next id.
pub struct FakeRemote {
    records: Mutex<Vec<Record>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    fail_list: AtomicBool,
    fail_replace: AtomicBool,
    fail_delete: AtomicBool,
    fail_upload: AtomicBool,
    fail_presigned: AtomicBool,
    ask_result: Mutex<ApiResult<QaReply>>,
    ask_gated: AtomicBool,
    ask_gate: Arc<Semaphore>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        Self {
            records: Mutex::new(records),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(next_id),
            fail_list: AtomicBool::new(false),
            fail_replace: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_upload: AtomicBool::new(false),
            fail_presigned: AtomicBool::new(false),
            ask_result: Mutex::new(Ok(QaReply::PlainText(String::new()))),
            ask_gated: AtomicBool::new(false),
            ask_gate: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn replaces(&self) -> Vec<Record> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Replace(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn server_records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn set_server_records(&self, records: Vec<Record>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_replace(&self, fail: bool) {
        self.fail_replace.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upload(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    pub fn fail_presigned(&self, fail: bool) {
        self.fail_presigned.store(fail, Ordering::SeqCst);
    }

    pub fn set_ask_result(&self, result: ApiResult<QaReply>) {
        *self.ask_result.lock().unwrap() = result;
    }

    /// Hold every `ask` call until [`FakeRemote::release_ask`]
    pub fn gate_ask(&self) {
        self.ask_gated.store(true, Ordering::SeqCst);
    }

    pub fn release_ask(&self) {
        self.ask_gate.add_permits(1);
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(flag: &AtomicBool) -> ApiResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(ApiError::Status {
                status: 500,
                body: "simulated failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn list(&self, filter: SelectionFilter) -> ApiResult<Vec<Record>> {
        self.log(Call::List(filter));
        Self::failure(&self.fail_list)?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| filter.query_value().map_or(true, |s| r.selected == s))
            .cloned()
            .collect())
    }

    async fn replace(&self, record: &Record) -> ApiResult<()> {
        self.log(Call::Replace(record.clone()));
        Self::failure(&self.fail_replace)?;
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(ApiError::Status {
                status: 404,
                body: "PDF not found".to_string(),
            }),
        }
    }

    async fn delete(&self, id: RecordId) -> ApiResult<()> {
        self.log(Call::Delete(id));
        Self::failure(&self.fail_delete)?;
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn upload(&self, file: &PendingFile) -> ApiResult<Record> {
        self.log(Call::Upload(file.file_name.clone()));
        Self::failure(&self.fail_upload)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Record {
            id: RecordId(id),
            name: file.file_name.clone(),
            file: format!("https://bucket.example/{}", file.file_name),
            selected: false,
        };
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn presigned_url(&self, id: RecordId) -> ApiResult<String> {
        self.log(Call::Presigned(id));
        Self::failure(&self.fail_presigned)?;
        Ok(format!("https://bucket.example/{}.pdf?signature=abc", id))
    }

    async fn ask(&self, id: RecordId, question: &str) -> ApiResult<QaReply> {
        self.log(Call::Ask(id, question.to_string()));
        if self.ask_gated.load(Ordering::SeqCst) {
            let permit = self
                .ask_gate
                .acquire()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            permit.forget();
        }
        self.ask_result.lock().unwrap().clone()
    }
}
