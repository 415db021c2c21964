//! Error types for pdfdesk-ui
//!
//! Every controller operation stops failures at its own boundary: the error
//! is logged, turned into a user-facing alert where appropriate, and returned
//! to the caller. Nothing here ever unwinds into unrelated state.

use crate::api::ApiError;
use pdfdesk_common::{RecordField, RecordId};
use thiserror::Error;

/// Input rejected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Question text is blank
    #[error("question is empty")]
    EmptyQuestion,

    /// No record has `selected == true`
    #[error("no record is selected")]
    NoRecordSelected,

    /// Upload submitted without a pending file
    #[error("no file selected")]
    NoFileSelected,

    /// Edit value of the wrong kind for the field
    #[error("field '{field}' expects a {expected} value")]
    FieldType {
        field: RecordField,
        expected: &'static str,
    },
}

/// Main error type for controller operations
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Edit or lookup targeted an id that is not in the store
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// A question is already in flight on this controller
    #[error("A question is already being processed")]
    Busy,

    #[error("Upload failed: {0}")]
    UploadFailed(#[source] ApiError),

    #[error("Delete failed: {0}")]
    DeleteFailed(#[source] ApiError),

    /// Any other remote failure (list refetch, Q&A request)
    #[error("Request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] pdfdesk_common::Error),
}

impl ControllerError {
    /// Whether the operation was rejected without contacting the remote
    pub fn is_validation(&self) -> bool {
        matches!(self, ControllerError::Validation(_))
    }
}

/// Convenience Result type using ControllerError
pub type Result<T> = std::result::Result<T, ControllerError>;
