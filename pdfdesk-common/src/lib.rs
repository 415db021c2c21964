//! # PDFDesk Common Library
//!
//! Shared code for the PDFDesk client crates including:
//! - Document record model and edit types
//! - Selection filter and Q&A phase types
//! - Configuration loading (TOML bootstrap + environment + defaults)
//! - UI event types and the broadcast EventBus

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
pub use models::{FieldValue, Record, RecordField, RecordId, SelectionFilter};
