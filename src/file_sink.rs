//! Durable JSONL sink for trace events
//!
//! One JSON object per line, appended to `.agent-trace/traces.jsonl`. The
//! record schema is versioned and is the external wire format: changes must
//! be additive so existing readers keep ingesting the stream. Readers must
//! tolerate unknown fields.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{Contributor, EventType, FileRange, Metadata, MetadataValue, TraceEvent};
use crate::semconv;

/// Errors for sink operations
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to write trace record: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize trace record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One conversation's contribution to a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Transcript URL, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub contributor: Contributor,
    pub ranges: Vec<FileRange>,
}

/// A file touched by the event, grouped with its conversations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub conversations: Vec<Conversation>,
}

/// VCS capture for the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcsInfo {
    #[serde(rename = "type")]
    pub vcs_type: String,
    /// Null when captured outside a repository; readers key off presence
    pub revision: Option<String>,
}

/// Tool capture for the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
}

/// The on-disk JSONL record (schema version 1.1)
///
/// Session and command events carry no `files` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub version: String,
    pub id: String,
    pub event_type: EventType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub vcs: VcsInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileEntry>>,
    pub metadata: Metadata,
}

impl TraceRecord {
    /// Map an event onto the wire schema.
    ///
    /// Events with a `file_path` get a single-entry `files` array holding one
    /// conversation (the event's contributor and ranges, plus the transcript
    /// URL when the `transcript_url` metadata key is present).
    pub fn from_event(event: &TraceEvent) -> Self {
        let files = event.file_path().map(|path| {
            let url = match event.metadata().get("transcript_url") {
                Some(MetadataValue::Str(url)) => Some(url.clone()),
                _ => None,
            };
            vec![FileEntry {
                path: path.to_string(),
                conversations: vec![Conversation {
                    url,
                    contributor: event.contributor().clone(),
                    ranges: event.ranges().to_vec(),
                }],
            }]
        });

        Self {
            version: semconv::RECORD_VERSION.to_string(),
            id: event.id().to_string(),
            event_type: event.event_type(),
            timestamp: event.timestamp(),
            session_id: event.session_id().map(str::to_string),
            vcs: VcsInfo {
                vcs_type: "git".to_string(),
                revision: event.vcs_revision().map(str::to_string),
            },
            tool: event.tool_name().map(|name| ToolInfo {
                name: name.to_string(),
            }),
            files,
            metadata: event.metadata().clone(),
        }
    }
}

/// Append-only JSONL sink
///
/// Each append is an independent open-append-close. Serialization happens
/// before the file is opened, and the line lands in a single `write_all`, so
/// a failing append cannot corrupt prior lines. The mutex serializes
/// concurrent appends from multiple threads.
pub struct FileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably append one record as a single JSONL line
    pub fn append(&self, record: &TraceRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
