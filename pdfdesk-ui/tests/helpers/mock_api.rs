//! Mock of the remote document service
//!
//! Serves the `/pdfs` API from an in-memory table on an ephemeral port and
//! records every request so tests can assert on what the client sent.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use pdfdesk_common::models::{PresignedUrl, QuestionRequest};
use pdfdesk_common::{Record, RecordId};
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// How the Q&A endpoint answers
#[derive(Debug, Clone)]
pub enum QaMode {
    /// `application/json` body
    Json(Value),
    /// `text/plain` body
    Text(String),
    /// Non-success status with no usable body
    Status(u16),
}

/// One request seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct SeenRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

struct MockState {
    records: Vec<Record>,
    next_id: i64,
    requests: Vec<SeenRequest>,
    uploads: Vec<(String, Vec<u8>)>,
    qa_mode: QaMode,
    fail_presigned: bool,
}

#[derive(Clone)]
struct Shared(Arc<Mutex<MockState>>);

/// Handle to a running mock service
pub struct MockApi {
    state: Shared,
    base_url: String,
    server: tokio::task::JoinHandle<()>,
}

impl MockApi {
    pub async fn start(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let state = Shared(Arc::new(Mutex::new(MockState {
            records,
            next_id,
            requests: Vec::new(),
            uploads: Vec::new(),
            qa_mode: QaMode::Json(serde_json::json!({"answer": ""})),
            fail_presigned: false,
        })));

        let app = Router::new()
            .route("/pdfs", get(list_pdfs))
            .route("/pdfs/upload", post(upload_pdf))
            .route("/pdfs/:id", put(update_pdf).delete(delete_pdf))
            .route("/pdfs/:id/presigned-url", get(presigned_url))
            .route("/pdfs/qa-pdf/:id", post(qa_pdf))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{}", addr),
            server,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_qa_mode(&self, mode: QaMode) {
        self.state.0.lock().unwrap().qa_mode = mode;
    }

    pub fn fail_presigned(&self, fail: bool) {
        self.state.0.lock().unwrap().fail_presigned = fail;
    }

    pub fn records(&self) -> Vec<Record> {
        self.state.0.lock().unwrap().records.clone()
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.0.lock().unwrap().requests.clone()
    }

    /// Requests with the given method
    pub fn requests_with(&self, method: &str) -> Vec<SeenRequest> {
        self.requests().into_iter().filter(|r| r.method == method).collect()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.state.0.lock().unwrap().uploads.clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl Shared {
    fn record(&self, method: &'static str, path: String, body: Option<Value>) {
        self.0.lock().unwrap().requests.push(SeenRequest { method, path, body });
    }
}

#[derive(Deserialize)]
struct ListParams {
    selected: Option<bool>,
}

async fn list_pdfs(State(state): State<Shared>, Query(params): Query<ListParams>) -> Json<Vec<Record>> {
    let path = match params.selected {
        Some(s) => format!("/pdfs?selected={}", s),
        None => "/pdfs".to_string(),
    };
    state.record("GET", path, None);
    let records = state.0.lock().unwrap().records.clone();
    Json(
        records
            .into_iter()
            .filter(|r| params.selected.map_or(true, |s| r.selected == s))
            .collect(),
    )
}

/// Whole-record replacement: a body missing any field is rejected
async fn update_pdf(State(state): State<Shared>, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    state.record("PUT", format!("/pdfs/{}", id), Some(body.clone()));
    let record: Record = match serde_json::from_value(body) {
        Ok(record) => record,
        Err(e) => return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    };

    let mut guard = state.0.lock().unwrap();
    match guard.records.iter_mut().find(|r| r.id == RecordId(id)) {
        Some(existing) => {
            *existing = Record {
                id: RecordId(id),
                ..record
            };
            Json(existing.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "PDF not found").into_response(),
    }
}

async fn delete_pdf(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    state.record("DELETE", format!("/pdfs/{}", id), None);
    let mut guard = state.0.lock().unwrap();
    let before = guard.records.len();
    guard.records.retain(|r| r.id != RecordId(id));
    if guard.records.len() == before {
        (StatusCode::NOT_FOUND, "PDF not found").into_response()
    } else {
        Json(serde_json::json!({"message": "PDF successfully deleted"})).into_response()
    }
}

async fn upload_pdf(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    state.record("POST", "/pdfs/upload".to_string(), None);
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };

        let mut guard = state.0.lock().unwrap();
        let id = guard.next_id;
        guard.next_id += 1;
        let record = Record {
            id: RecordId(id),
            name: file_name.clone(),
            file: format!("https://bucket.example/{}", file_name),
            selected: false,
        };
        guard.records.push(record.clone());
        guard.uploads.push((file_name, bytes));
        return (StatusCode::CREATED, Json(record)).into_response();
    }
    (StatusCode::UNPROCESSABLE_ENTITY, "missing file field").into_response()
}

async fn presigned_url(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    state.record("GET", format!("/pdfs/{}/presigned-url", id), None);
    if state.0.lock().unwrap().fail_presigned {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate presigned URL").into_response();
    }
    Json(PresignedUrl {
        url: format!("https://bucket.example/{}.pdf?X-Signature=mock", id),
    })
    .into_response()
}

async fn qa_pdf(State(state): State<Shared>, Path(id): Path<i64>, Json(request): Json<QuestionRequest>) -> Response {
    state.record(
        "POST",
        format!("/pdfs/qa-pdf/{}", id),
        Some(serde_json::json!({"question": request.question})),
    );
    let mode = state.0.lock().unwrap().qa_mode.clone();
    match mode {
        QaMode::Json(value) => Json(value).into_response(),
        QaMode::Text(text) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response(),
        QaMode::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "Error processing question").into_response()
        }
    }
}
