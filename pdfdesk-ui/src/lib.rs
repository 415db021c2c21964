//! pdfdesk-ui library - document list controller
//!
//! Keeps a locally displayed list of document records in sync with the
//! remote document service:
//! - optimistic local edits, written back as coalesced full-record replaces
//! - server-side selection filtering
//! - multi-part file upload and confirmed deletion
//! - single-flight question/answer against the selected document

pub mod api;
pub mod coalescer;
pub mod controller;
pub mod deletion;
pub mod error;
pub mod filter;
pub mod qa;
pub mod store;
pub mod upload;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::DocumentController;
pub use error::{ControllerError, Result, ValidationError};
