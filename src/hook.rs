//! Hook payload adapter
//!
//! Translates one hook payload from a host AI coding tool into a file-edit
//! trace, or declines. All fields except `hook_event_name` are optional, and
//! a malformed or uninteresting payload is a skip, never an error: tracing
//! must not break the host tool's workflow.

use serde::Deserialize;
use serde_json::Value;

use crate::event::{FileRange, ValidationError};

/// Hook events that indicate a completed file modification
const FILE_EDIT_EVENTS: &[&str] = &["PostToolUse", "afterFileEdit", "afterTabFileEdit"];

/// Tools whose invocations modify files
const EDIT_TOOLS: &[&str] = &["Write", "Edit"];

/// Input from a host tool's hook (matches the hook JSON schema)
#[derive(Debug, Clone, Deserialize)]
pub struct HookInput {
    pub hook_event_name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Value>,
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Outcome of handling one hook payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookStatus {
    /// A trace was recorded
    Recorded,
    /// Nothing was recorded, with the reason
    Skipped(String),
}

impl HookStatus {
    pub fn recorded(&self) -> bool {
        matches!(self, HookStatus::Recorded)
    }
}

/// A file edit derived from a hook payload, ready for the tracer facade
#[derive(Debug, Clone, PartialEq)]
pub struct HookFileEdit {
    pub file_path: String,
    pub ranges: Vec<FileRange>,
    pub model: Option<String>,
    pub tool_name: String,
    pub session_id: Option<String>,
    pub transcript_url: Option<String>,
}

/// Derive a file edit from a hook payload, or decline with a reason.
pub fn file_edit_from_hook(
    hook: &HookInput,
) -> std::result::Result<HookFileEdit, String> {
    if !FILE_EDIT_EVENTS.contains(&hook.hook_event_name.as_str()) {
        return Err(format!(
            "hook event '{}' is not a file modification",
            hook.hook_event_name
        ));
    }

    let tool_name = hook.tool_name.as_deref().unwrap_or_default();
    if !EDIT_TOOLS.contains(&tool_name) {
        return Err(format!("tool '{tool_name}' does not modify files"));
    }

    let file_path = hook
        .file_path
        .clone()
        .or_else(|| tool_input_str(hook, "file_path"))
        .filter(|p| !p.is_empty());
    let Some(file_path) = file_path else {
        return Err("hook payload carries no file path".to_string());
    };

    let ranges = derived_ranges(hook).map_err(|e| e.to_string())?;

    let transcript_url = hook
        .transcript_path
        .as_deref()
        .map(|path| format!("file://{path}"));

    Ok(HookFileEdit {
        file_path,
        ranges,
        model: hook.model.clone(),
        tool_name: tool_name.to_string(),
        session_id: hook.session_id.clone(),
        transcript_url,
    })
}

/// Ranges from the edited content's line count, falling back to `1..=1`
fn derived_ranges(hook: &HookInput) -> std::result::Result<Vec<FileRange>, ValidationError> {
    let new_content = tool_input_str(hook, "new_string").or_else(|| tool_input_str(hook, "content"));
    let range = match new_content {
        Some(content) if !content.is_empty() => {
            let line_count = content.lines().count().max(1) as u32;
            FileRange::new(1, line_count)?
        }
        _ => FileRange::new(1, 1)?,
    };
    Ok(vec![range])
}

fn tool_input_str(hook: &HookInput, key: &str) -> Option<String> {
    hook.tool_input
        .as_ref()
        .and_then(|input| input.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hook(event: &str, tool: Option<&str>) -> HookInput {
        HookInput {
            hook_event_name: event.to_string(),
            model: Some("claude-sonnet-4-20250514".to_string()),
            transcript_path: Some("/tmp/transcript.jsonl".to_string()),
            session_id: Some("sess-1".to_string()),
            file_path: Some("/repo/src/main.rs".to_string()),
            tool_name: tool.map(str::to_string),
            tool_use_id: None,
            tool_input: None,
            cwd: None,
        }
    }

    #[test]
    fn test_session_start_declined() {
        let result = file_edit_from_hook(&hook("SessionStart", Some("Write")));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_tool_declined() {
        let result = file_edit_from_hook(&hook("PostToolUse", Some("Read")));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_tool_declined() {
        let result = file_edit_from_hook(&hook("PostToolUse", None));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_path_declined() {
        let mut input = hook("PostToolUse", Some("Edit"));
        input.file_path = None;
        let result = file_edit_from_hook(&input);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_accepted() {
        let edit = file_edit_from_hook(&hook("PostToolUse", Some("Edit"))).unwrap();
        assert_eq!(edit.file_path, "/repo/src/main.rs");
        assert_eq!(edit.tool_name, "Edit");
        assert_eq!(
            edit.transcript_url.as_deref(),
            Some("file:///tmp/transcript.jsonl")
        );
        // No content in the payload means the minimal 1..=1 range
        assert_eq!(edit.ranges, vec![FileRange::new(1, 1).unwrap()]);
    }

    #[test]
    fn test_ranges_from_new_string() {
        let mut input = hook("PostToolUse", Some("Write"));
        input.tool_input = Some(json!({"new_string": "a\nb\nc"}));
        let edit = file_edit_from_hook(&input).unwrap();
        assert_eq!(edit.ranges, vec![FileRange::new(1, 3).unwrap()]);
    }

    #[test]
    fn test_file_path_from_tool_input() {
        let mut input = hook("afterFileEdit", Some("Write"));
        input.file_path = None;
        input.tool_input = Some(json!({"file_path": "src/lib.rs", "content": "x\ny"}));
        let edit = file_edit_from_hook(&input).unwrap();
        assert_eq!(edit.file_path, "src/lib.rs");
        assert_eq!(edit.ranges, vec![FileRange::new(1, 2).unwrap()]);
    }

    #[test]
    fn test_unknown_json_fields_ignored() {
        let input: HookInput = serde_json::from_value(json!({
            "hook_event_name": "PostToolUse",
            "tool_name": "Write",
            "file_path": "a.rs",
            "some_future_field": {"x": 1}
        }))
        .unwrap();
        assert!(file_edit_from_hook(&input).is_ok());
    }
}
