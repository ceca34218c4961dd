//! Integration tests for the tracer facade: fan-out, convenience methods,
//! hook handling, and the global accessor.

use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use agent_trace::config::{TracerConfig, TracerOverrides};
use agent_trace::event::{Contributor, EventType, FileRange, TraceEvent};
use agent_trace::hook::HookInput;
use agent_trace::tracer::{
    global_tracer, reset_global_tracer, AgentTracer, CodeReviewOptions, CommandRunOptions,
    CustomOptions, DebugOptions, FileCreateOptions, FileDeleteOptions, FileEditOptions,
    RefactorOptions, SessionOptions, SuggestionOptions, TestGenerateOptions, TestRunOptions,
};

fn file_only_tracer(trace_file: PathBuf) -> AgentTracer {
    AgentTracer::new(TracerConfig {
        file_export: true,
        console_export: false,
        trace_file: Some(trace_file),
        ..TracerConfig::default()
    })
    .unwrap()
}

fn read_records(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_trace_event_appends_exactly_one_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traces.jsonl");
    let tracer = file_only_tracer(path.clone());

    let event = TraceEvent::builder(EventType::Custom).build();
    tracer.trace_event(&event);

    let records = read_records(&path);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], event.id().to_string());
}

#[test]
fn test_two_events_two_lines_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traces.jsonl");
    let tracer = file_only_tracer(path.clone());

    let first = TraceEvent::builder(EventType::SessionStart)
        .session_id("sess-1")
        .build();
    let second = TraceEvent::builder(EventType::SessionEnd)
        .session_id("sess-1")
        .build();
    tracer.trace_event(&first);
    tracer.trace_event(&second);

    let records = read_records(&path);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], first.id().to_string());
    assert_eq!(records[1]["id"], second.id().to_string());
}

#[test]
fn test_file_edit_scenario_wire_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traces.jsonl");
    let tracer = file_only_tracer(path.clone());

    tracer
        .trace_file_edit(
            "src/main.py",
            vec![FileRange::new(10, 25).unwrap()],
            FileEditOptions {
                model: Some("claude-sonnet-4-20250514".to_string()),
                tool_name: Some("Edit".to_string()),
                session_id: Some("sess-1".to_string()),
                transcript_url: None,
            },
        )
        .unwrap();

    let records = read_records(&path);
    let record = &records[0];
    assert_eq!(record["version"], "1.1");
    assert_eq!(record["event_type"], "file_edit");
    assert_eq!(record["files"][0]["path"], "src/main.py");
    let conversation = &record["files"][0]["conversations"][0];
    assert_eq!(
        conversation["contributor"]["model_id"],
        "anthropic/claude-sonnet-4-20250514"
    );
    assert_eq!(conversation["contributor"]["type"], "ai");
    assert_eq!(
        conversation["ranges"][0],
        serde_json::json!({"start_line": 10, "end_line": 25})
    );
    assert_eq!(record["tool"]["name"], "Edit");
    assert_eq!(record["session_id"], "sess-1");
}

#[test]
fn test_session_events_omit_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traces.jsonl");
    let tracer = file_only_tracer(path.clone());

    tracer
        .trace_session_start("sess-9", SessionOptions::default())
        .unwrap();
    tracer
        .trace_command_run(
            "cargo test",
            CommandRunOptions {
                exit_code: Some(0),
                ..CommandRunOptions::default()
            },
        )
        .unwrap();

    let records = read_records(&path);
    assert_eq!(records[0]["event_type"], "session_start");
    assert!(records[0].get("files").is_none());
    assert_eq!(records[1]["event_type"], "command_run");
    assert!(records[1].get("files").is_none());
    assert_eq!(records[1]["metadata"]["command"], "cargo test");
    assert_eq!(records[1]["metadata"]["exit_code"], 0);
}

#[test]
fn test_every_event_category_writes_a_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traces.jsonl");
    let tracer = file_only_tracer(path.clone());
    let ranges = || vec![FileRange::new(1, 5).unwrap()];

    tracer
        .trace_session_start("s", SessionOptions::default())
        .unwrap();
    tracer
        .trace_file_create(
            "a.rs",
            FileCreateOptions {
                line_count: 12,
                ..FileCreateOptions::default()
            },
        )
        .unwrap();
    tracer
        .trace_file_edit("a.rs", ranges(), FileEditOptions::default())
        .unwrap();
    tracer
        .trace_file_delete("a.rs", FileDeleteOptions::default())
        .unwrap();
    tracer
        .trace_code_review(
            "a.rs",
            ranges(),
            CodeReviewOptions {
                review_type: Some("security".to_string()),
                findings: Some(vec!["finding".to_string()]),
                ..CodeReviewOptions::default()
            },
        )
        .unwrap();
    tracer
        .trace_code_suggestion("a.rs", ranges(), SuggestionOptions::default())
        .unwrap();
    tracer
        .trace_refactor("a.rs", ranges(), RefactorOptions::default())
        .unwrap();
    tracer
        .trace_debug(
            "a.rs",
            ranges(),
            DebugOptions {
                resolved: true,
                ..DebugOptions::default()
            },
        )
        .unwrap();
    tracer
        .trace_test_generate("a_test.rs", ranges(), TestGenerateOptions::default())
        .unwrap();
    tracer
        .trace_test_run(TestRunOptions {
            passed: 3,
            failed: 1,
            ..TestRunOptions::default()
        })
        .unwrap();
    tracer
        .trace_command_run("ls", CommandRunOptions::default())
        .unwrap();
    tracer
        .trace_custom("deploy", CustomOptions::default())
        .unwrap();
    tracer
        .trace_session_end("s", SessionOptions::default())
        .unwrap();

    let records = read_records(&path);
    let types: Vec<&str> = records
        .iter()
        .map(|r| r["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec![
            "session_start",
            "file_create",
            "file_edit",
            "file_delete",
            "code_review",
            "code_suggest",
            "refactor",
            "debug",
            "test_generate",
            "test_run",
            "command_run",
            "custom",
            "session_end",
        ]
    );

    // Category metadata contracts
    assert_eq!(
        records[1]["files"][0]["conversations"][0]["ranges"][0],
        serde_json::json!({"start_line": 1, "end_line": 12})
    );
    assert_eq!(records[4]["metadata"]["review_type"], "security");
    assert_eq!(records[4]["metadata"]["finding_count"], 1);
    assert_eq!(records[7]["metadata"]["resolved"], true);
    assert_eq!(records[9]["metadata"]["passed"], 3);
    assert_eq!(records[9]["metadata"]["total"], 4);
    assert_eq!(records[11]["metadata"]["custom_event_name"], "deploy");
}

#[test]
fn test_file_sink_failure_is_isolated() {
    // Unwritable trace file: trace_event must still return normally and the
    // span path must still be attempted.
    let tracer = AgentTracer::new(TracerConfig {
        file_export: true,
        trace_file: Some(PathBuf::from("/dev/null/nope/traces.jsonl")),
        ..TracerConfig::default()
    })
    .unwrap();

    let event = TraceEvent::builder(EventType::FileEdit)
        .file_path("src/x.rs")
        .contributor(Contributor::ai(Some("gpt-4o")))
        .build();
    tracer.trace_event(&event);
    tracer.shutdown();
}

#[test]
fn test_handle_hook_records_file_edit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traces.jsonl");
    let tracer = file_only_tracer(path.clone());

    let hook: HookInput = serde_json::from_value(serde_json::json!({
        "hook_event_name": "PostToolUse",
        "tool_name": "Write",
        "file_path": "src/generated.rs",
        "model": "claude-sonnet-4-20250514",
        "session_id": "sess-7",
        "tool_input": {"new_string": "line1\nline2\nline3"}
    }))
    .unwrap();

    let status = tracer.handle_hook(&hook);
    assert!(status.recorded());

    let records = read_records(&path);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["files"][0]["path"], "src/generated.rs");
    assert_eq!(
        records[0]["files"][0]["conversations"][0]["ranges"][0],
        serde_json::json!({"start_line": 1, "end_line": 3})
    );
}

#[test]
fn test_handle_hook_skips_non_edit_events() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traces.jsonl");
    let tracer = file_only_tracer(path.clone());

    let hook: HookInput = serde_json::from_value(serde_json::json!({
        "hook_event_name": "SessionStart"
    }))
    .unwrap();

    let status = tracer.handle_hook(&hook);
    assert!(!status.recorded());
    assert!(!path.exists());
}

#[test]
#[serial]
fn test_global_tracer_is_shared_until_reset() {
    reset_global_tracer();
    let dir = TempDir::new().unwrap();
    let overrides = TracerOverrides {
        file_export: Some(true),
        trace_file: Some(dir.path().join("traces.jsonl")),
        ..TracerOverrides::default()
    };

    let first = global_tracer(overrides.clone()).unwrap();
    // Second call's overrides are ignored; the first configuration sticks
    let second = global_tracer(TracerOverrides {
        file_export: Some(false),
        ..TracerOverrides::default()
    })
    .unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    reset_global_tracer();
    let third = global_tracer(overrides).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &third));
    reset_global_tracer();
}
