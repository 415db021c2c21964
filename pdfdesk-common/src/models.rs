//! Document record model shared by the PDFDesk crates
//!
//! Mirrors the JSON bodies exchanged with the remote document service:
//! `GET /pdfs` returns an array of [`Record`], `PUT /pdfs/{id}` takes a full
//! [`Record`], `POST /pdfs/qa-pdf/{id}` takes a [`QuestionRequest`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned record identifier
///
/// Opaque to the client: only compared, formatted into URLs and echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(RecordId)
            .map_err(|_| Error::InvalidInput(format!("invalid record id: {:?}", s)))
    }
}

/// One document entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable server-assigned identifier
    pub id: RecordId,
    /// User-editable label
    pub name: String,
    /// Reference to the stored binary content (raw storage URL)
    pub file: String,
    /// Selection flag; the first selected record is the Q&A target
    pub selected: bool,
}

impl Record {
    /// Set `field` to `value` in place
    ///
    /// Fails with `InvalidInput` when the value kind does not match the field.
    pub fn apply(&mut self, field: RecordField, value: FieldValue) -> Result<()> {
        match (field, value) {
            (RecordField::Name, FieldValue::Text(name)) => {
                self.name = name;
                Ok(())
            }
            (RecordField::Selected, FieldValue::Flag(selected)) => {
                self.selected = selected;
                Ok(())
            }
            (field, value) => Err(Error::InvalidInput(format!(
                "field '{}' expects {}, got {}",
                field,
                field.kind(),
                value.kind()
            ))),
        }
    }

    /// Current value of `field`
    pub fn get(&self, field: RecordField) -> FieldValue {
        match field {
            RecordField::Name => FieldValue::Text(self.name.clone()),
            RecordField::Selected => FieldValue::Flag(self.selected),
        }
    }
}

/// User-editable record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Name,
    Selected,
}

impl RecordField {
    /// Kind of value the field holds ("text" or "flag")
    pub fn kind(self) -> &'static str {
        match self {
            RecordField::Name => "text",
            RecordField::Selected => "flag",
        }
    }

    /// Whether `value` is of the kind this field holds
    pub fn accepts(self, value: &FieldValue) -> bool {
        self.kind() == value.kind()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordField::Name => "name",
            RecordField::Selected => "selected",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(RecordField::Name),
            "selected" => Ok(RecordField::Selected),
            other => Err(Error::InvalidInput(format!("unknown record field: {}", other))),
        }
    }
}

/// New value for a [`RecordField`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Flag(_) => "flag",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// Tri-state selection filter driving which records the server returns
///
/// Exactly one filter is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionFilter {
    /// No filter applied
    #[default]
    Unset,
    /// Only records with `selected == true`
    Selected,
    /// Only records with `selected == false`
    NotSelected,
}

impl SelectionFilter {
    /// All filter states, in display order
    pub const ALL: [SelectionFilter; 3] = [
        SelectionFilter::Unset,
        SelectionFilter::Selected,
        SelectionFilter::NotSelected,
    ];

    /// Value of the `selected` query parameter, `None` when unset
    pub fn query_value(self) -> Option<bool> {
        match self {
            SelectionFilter::Unset => None,
            SelectionFilter::Selected => Some(true),
            SelectionFilter::NotSelected => Some(false),
        }
    }

    pub fn from_query(value: Option<bool>) -> Self {
        match value {
            None => SelectionFilter::Unset,
            Some(true) => SelectionFilter::Selected,
            Some(false) => SelectionFilter::NotSelected,
        }
    }

    /// Whether this filter is the one to highlight given the current filter
    pub fn is_active(self, current: SelectionFilter) -> bool {
        self == current
    }

    /// Button label
    pub fn label(self) -> &'static str {
        match self {
            SelectionFilter::Unset => "See All",
            SelectionFilter::Selected => "See Selected",
            SelectionFilter::NotSelected => "See Not Selected",
        }
    }
}

impl fmt::Display for SelectionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.query_value() {
            None => f.write_str("unset"),
            Some(v) => write!(f, "{}", v),
        }
    }
}

/// Phases of the single-flight question/answer cycle
///
/// `Idle -> Validating -> AwaitingResponse -> {Answered | Failed} -> Idle`.
/// Validation failures go straight back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaPhase {
    #[default]
    Idle,
    Validating,
    AwaitingResponse,
    Answered,
    Failed,
}

impl QaPhase {
    /// Whether `self -> next` is an edge of the Q&A state machine
    pub fn can_transition_to(self, next: QaPhase) -> bool {
        use QaPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Idle)
                | (Validating, AwaitingResponse)
                | (AwaitingResponse, Answered)
                | (AwaitingResponse, Failed)
                | (AwaitingResponse, Idle)
                | (Answered, Idle)
                | (Failed, Idle)
        )
    }
}

impl fmt::Display for QaPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QaPhase::Idle => "idle",
            QaPhase::Validating => "validating",
            QaPhase::AwaitingResponse => "awaiting_response",
            QaPhase::Answered => "answered",
            QaPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Body of `POST /pdfs/qa-pdf/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

/// Body returned by `GET /pdfs/{id}/presigned-url`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUrl {
    pub url: String,
}
