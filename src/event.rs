//! Event and attribution data model
//!
//! Typed records describing one code-change/session/command event and who
//! (human/AI/mixed) produced it. Invariants are enforced at construction:
//! a built [`TraceEvent`] is immutable and structurally valid, so sinks never
//! re-validate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model_id;

/// Errors for event construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// A range of lines in a file, 1-indexed and inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFileRange")]
pub struct FileRange {
    start_line: u32,
    end_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_hash: Option<String>,
}

/// Unvalidated wire shape for [`FileRange`]
#[derive(Deserialize)]
struct RawFileRange {
    start_line: u32,
    end_line: u32,
    #[serde(default)]
    content_hash: Option<String>,
}

impl TryFrom<RawFileRange> for FileRange {
    type Error = ValidationError;

    fn try_from(raw: RawFileRange) -> Result<Self> {
        let range = FileRange::new(raw.start_line, raw.end_line)?;
        Ok(match raw.content_hash {
            Some(hash) => range.with_content_hash(hash),
            None => range,
        })
    }
}

impl FileRange {
    /// Create a validated range. Rejects `start_line < 1` and
    /// `end_line < start_line`.
    pub fn new(start_line: u32, end_line: u32) -> Result<Self> {
        if start_line < 1 {
            return Err(ValidationError::new(
                "start_line",
                "line numbers are 1-indexed",
            ));
        }
        if end_line < start_line {
            return Err(ValidationError::new(
                "end_line",
                format!("end_line {end_line} precedes start_line {start_line}"),
            ));
        }
        Ok(Self {
            start_line,
            end_line,
            content_hash: None,
        })
    }

    /// Attach a hash for position-independent tracking
    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }
}

/// Type of code contributor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributorType {
    Human,
    Ai,
    Mixed,
    Unknown,
}

impl ContributorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributorType::Human => "human",
            ContributorType::Ai => "ai",
            ContributorType::Mixed => "mixed",
            ContributorType::Unknown => "unknown",
        }
    }
}

/// Attribution contributor info
///
/// `model_id` is only permitted on `Ai` and `Mixed` contributors and is
/// normalized to `vendor/model` form once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContributor")]
pub struct Contributor {
    #[serde(rename = "type")]
    contributor_type: ContributorType,
    model_id: Option<String>,
}

/// Unvalidated wire shape for [`Contributor`]
#[derive(Deserialize)]
struct RawContributor {
    #[serde(rename = "type")]
    contributor_type: ContributorType,
    #[serde(default)]
    model_id: Option<String>,
}

impl TryFrom<RawContributor> for Contributor {
    type Error = ValidationError;

    fn try_from(raw: RawContributor) -> Result<Self> {
        Contributor::new(raw.contributor_type, raw.model_id.as_deref())
    }
}

impl Contributor {
    /// Create a contributor, normalizing the model identifier.
    pub fn new(contributor_type: ContributorType, model: Option<&str>) -> Result<Self> {
        let model_id = model_id::normalize_opt(model);
        if model_id.is_some()
            && !matches!(
                contributor_type,
                ContributorType::Ai | ContributorType::Mixed
            )
        {
            return Err(ValidationError::new(
                "model_id",
                format!(
                    "model_id is only valid for ai/mixed contributors, got {}",
                    contributor_type.as_str()
                ),
            ));
        }
        Ok(Self {
            contributor_type,
            model_id,
        })
    }

    /// An AI contributor with an optional raw model identifier
    pub fn ai(model: Option<&str>) -> Self {
        Self {
            contributor_type: ContributorType::Ai,
            model_id: model_id::normalize_opt(model),
        }
    }

    /// A human contributor
    pub fn human() -> Self {
        Self {
            contributor_type: ContributorType::Human,
            model_id: None,
        }
    }

    pub fn contributor_type(&self) -> ContributorType {
        self.contributor_type
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }
}

/// Types of events that can be traced (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    // File operations
    FileCreate,
    FileEdit,
    FileDelete,
    // Session lifecycle
    SessionStart,
    SessionEnd,
    // Code assistance
    CodeReview,
    CodeSuggest,
    Refactor,
    Debug,
    // Testing
    TestGenerate,
    TestRun,
    // Terminal/commands
    CommandRun,
    // Generic
    Custom,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::FileCreate => "file_create",
            EventType::FileEdit => "file_edit",
            EventType::FileDelete => "file_delete",
            EventType::SessionStart => "session_start",
            EventType::SessionEnd => "session_end",
            EventType::CodeReview => "code_review",
            EventType::CodeSuggest => "code_suggest",
            EventType::Refactor => "refactor",
            EventType::Debug => "debug",
            EventType::TestGenerate => "test_generate",
            EventType::TestRun => "test_run",
            EventType::CommandRun => "command_run",
            EventType::Custom => "custom",
        }
    }
}

/// A scalar metadata value
///
/// Variant order matters for untagged deserialization: bool before int
/// before float before string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<u32> for MetadataValue {
    fn from(value: u32) -> Self {
        MetadataValue::Int(i64::from(value))
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Int(value as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Str(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Str(value)
    }
}

/// Free-form per-category metadata (BTreeMap for deterministic output order)
pub type Metadata = BTreeMap<String, MetadataValue>;

/// An event to be traced
///
/// Immutable once built: the pipeline hands the same logical value to every
/// sink and never mutates a captured event in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    id: Uuid,
    timestamp: DateTime<Utc>,
    event_type: EventType,
    file_path: Option<String>,
    ranges: Vec<FileRange>,
    contributor: Contributor,
    tool_name: Option<String>,
    session_id: Option<String>,
    vcs_revision: Option<String>,
    metadata: Metadata,
}

impl TraceEvent {
    pub fn builder(event_type: EventType) -> TraceEventBuilder {
        TraceEventBuilder::new(event_type)
    }

    /// Unique, time-sortable identifier (UUID v7)
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn ranges(&self) -> &[FileRange] {
        &self.ranges
    }

    pub fn contributor(&self) -> &Contributor {
        &self.contributor
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Revision captured by the VCS collaborator at event time, never
    /// recomputed later.
    pub fn vcs_revision(&self) -> Option<&str> {
        self.vcs_revision.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Builder for [`TraceEvent`]
///
/// Validation lives in the typed parts ([`FileRange`], [`Contributor`]), so
/// `build` is infallible; the id and timestamp are assigned at build time.
#[derive(Debug, Clone)]
pub struct TraceEventBuilder {
    event_type: EventType,
    file_path: Option<String>,
    ranges: Vec<FileRange>,
    contributor: Contributor,
    tool_name: Option<String>,
    session_id: Option<String>,
    vcs_revision: Option<String>,
    metadata: Metadata,
}

impl TraceEventBuilder {
    fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            file_path: None,
            ranges: Vec::new(),
            contributor: Contributor::ai(None),
            tool_name: None,
            session_id: None,
            vcs_revision: None,
            metadata: Metadata::new(),
        }
    }

    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn ranges(mut self, ranges: Vec<FileRange>) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn contributor(mut self, contributor: Contributor) -> Self {
        self.contributor = contributor;
        self
    }

    pub fn tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn maybe_tool_name(mut self, tool_name: Option<String>) -> Self {
        self.tool_name = tool_name;
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn maybe_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn vcs_revision(mut self, revision: Option<String>) -> Self {
        self.vcs_revision = revision;
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata_entry(
        mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> TraceEvent {
        TraceEvent {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            file_path: self.file_path,
            ranges: self.ranges,
            contributor: self.contributor,
            tool_name: self.tool_name,
            session_id: self.session_id,
            vcs_revision: self.vcs_revision,
            metadata: self.metadata,
        }
    }
}
