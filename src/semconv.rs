//! Semantic convention attribute names for agent traces
//!
//! These keys are a fixed, versioned namespace: downstream dashboards key off
//! them, so exact names must stay stable. Line ranges are flattened to one
//! attribute pair per range index (`agent_trace.range.<i>.start_line` /
//! `agent_trace.range.<i>.end_line`); `range_start_attr` / `range_end_attr`
//! build the indexed keys.

pub const ATTR_CONTRIBUTOR_TYPE: &str = "agent_trace.contributor.type";
pub const ATTR_MODEL_ID: &str = "agent_trace.contributor.model_id";
pub const ATTR_EVENT_TYPE: &str = "agent_trace.event.type";
pub const ATTR_FILE_PATH: &str = "agent_trace.file.path";
pub const ATTR_TOOL_NAME: &str = "agent_trace.tool.name";
pub const ATTR_SESSION_ID: &str = "agent_trace.session.id";
pub const ATTR_VCS_REVISION: &str = "agent_trace.vcs.revision";
pub const ATTR_TRANSCRIPT_URL: &str = "agent_trace.conversation.url";

/// Prefix for free-form event metadata (`agent_trace.metadata.<key>`)
pub const ATTR_METADATA_PREFIX: &str = "agent_trace.metadata.";

/// Indexed start-line attribute for range `i`
pub fn range_start_attr(index: usize) -> String {
    format!("agent_trace.range.{index}.start_line")
}

/// Indexed end-line attribute for range `i`
pub fn range_end_attr(index: usize) -> String {
    format!("agent_trace.range.{index}.end_line")
}

/// Indexed content-hash attribute for range `i` (position-independent tracking)
pub fn range_content_hash_attr(index: usize) -> String {
    format!("agent_trace.range.{index}.content_hash")
}

/// Default trace file path, relative to the workspace root
pub const TRACE_FILE: &str = ".agent-trace/traces.jsonl";

/// JSONL record schema version (changes must be additive)
pub const RECORD_VERSION: &str = "1.1";

/// Default OTel service name
pub const SERVICE_NAME: &str = "agent-trace";

// Environment variable names
pub const ENV_OTLP_ENDPOINT: &str = "AGENT_TRACE_OTLP_ENDPOINT";
pub const ENV_AZURE_CONNECTION_STRING: &str = "APPLICATIONINSIGHTS_CONNECTION_STRING";
pub const ENV_FILE_EXPORT: &str = "AGENT_TRACE_FILE_EXPORT";
pub const ENV_CONSOLE_EXPORT: &str = "AGENT_TRACE_CONSOLE_EXPORT";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_range_attrs() {
        assert_eq!(range_start_attr(0), "agent_trace.range.0.start_line");
        assert_eq!(range_end_attr(2), "agent_trace.range.2.end_line");
        assert_eq!(
            range_content_hash_attr(1),
            "agent_trace.range.1.content_hash"
        );
    }
}
