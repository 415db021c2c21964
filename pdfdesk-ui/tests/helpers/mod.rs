//! Test helper modules for pdfdesk-ui integration tests
//!
//! Provides reusable test infrastructure components:
//! - MockApi: in-process mock of the remote document service
//! - record: compact Record constructor

#![allow(dead_code)]

pub mod mock_api;

pub use mock_api::{MockApi, QaMode, SeenRequest};

use pdfdesk_common::{Record, RecordId};

pub fn record(id: i64, name: &str, selected: bool) -> Record {
    Record {
        id: RecordId(id),
        name: name.to_string(),
        file: format!("https://bucket.example/{}.pdf", id),
        selected,
    }
}
