//! Remote document service interface
//!
//! The controller depends only on [`RemoteStore`]. [`HttpRemote`] talks to
//! the real service over HTTP; tests substitute an in-memory double.

mod http;
mod reply;

pub use http::HttpRemote;
pub use reply::{is_structured_content_type, QaReply};

use crate::upload::PendingFile;
use async_trait::async_trait;
use pdfdesk_common::{Record, RecordId, SelectionFilter};
use thiserror::Error;

/// Remote call errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection failed or the request could not be sent
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the server was reached at all
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Whether the server answered with a non-success status
    pub fn is_status(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Operations the controller needs from the remote document service
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `GET /pdfs[?selected=<bool>]`
    async fn list(&self, filter: SelectionFilter) -> ApiResult<Vec<Record>>;

    /// `PUT /pdfs/{id}` with the full record; whole-record replacement
    async fn replace(&self, record: &Record) -> ApiResult<()>;

    /// `DELETE /pdfs/{id}`
    async fn delete(&self, id: RecordId) -> ApiResult<()>;

    /// `POST /pdfs/upload` with a multi-part `file` field
    async fn upload(&self, file: &PendingFile) -> ApiResult<Record>;

    /// `GET /pdfs/{id}/presigned-url`
    async fn presigned_url(&self, id: RecordId) -> ApiResult<String>;

    /// `POST /pdfs/qa-pdf/{id}` with `{ "question": ... }`
    async fn ask(&self, id: RecordId, question: &str) -> ApiResult<QaReply>;
}
