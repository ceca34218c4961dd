//! Tracer facade for AI code attribution
//!
//! Single configured access point: owns the span emitter and the file sink,
//! exposes one typed convenience method per event category plus the generic
//! [`AgentTracer::trace_event`], and guarantees every event gets a
//! best-effort emission attempt per enabled sink before the call returns.
//!
//! Sink failures never escape `trace_event`; they downgrade to warn-level
//! diagnostics. Tracing is auxiliary and must never crash the host tool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::config::{ConfigError, TracerConfig, TracerOverrides};
use crate::event::{
    Contributor, EventType, FileRange, Metadata, MetadataValue, TraceEvent, ValidationError,
};
use crate::file_sink::{FileSink, TraceRecord};
use crate::hook::{self, HookInput, HookStatus};
use crate::semconv;
use crate::span_emitter::SpanEmitter;
use crate::vcs;

/// Tracer for AI code attribution
pub struct AgentTracer {
    workspace_root: PathBuf,
    span_emitter: SpanEmitter,
    file_sink: Option<FileSink>,
}

impl AgentTracer {
    /// Construct a tracer from explicit configuration.
    ///
    /// Fails fast on unusable configuration; the workspace root is resolved
    /// once, here.
    pub fn new(config: TracerConfig) -> Result<Self, ConfigError> {
        let workspace_root = vcs::workspace_root();
        let span_emitter = SpanEmitter::new(&config)?;
        let file_sink = config.file_export.then(|| {
            let path = config
                .trace_file
                .clone()
                .unwrap_or_else(|| workspace_root.join(semconv::TRACE_FILE));
            FileSink::new(path)
        });
        Ok(Self {
            workspace_root,
            span_emitter,
            file_sink,
        })
    }

    /// Record one event through every enabled sink.
    ///
    /// Both sinks receive the same logical event exactly once; a failure in
    /// one is isolated from the other and reported at warn level.
    pub fn trace_event(&self, event: &TraceEvent) {
        if let Some(sink) = &self.file_sink {
            let record = TraceRecord::from_event(event);
            if let Err(e) = sink.append(&record) {
                warn!(
                    error = %e,
                    path = %sink.path().display(),
                    event_id = %event.id(),
                    "file sink append failed"
                );
            }
        }
        self.span_emitter.emit(event);
    }

    /// Trace a file edit
    pub fn trace_file_edit(
        &self,
        file_path: &str,
        ranges: Vec<FileRange>,
        opts: FileEditOptions,
    ) -> Result<(), ValidationError> {
        let mut builder = TraceEvent::builder(EventType::FileEdit)
            .file_path(self.relative(file_path))
            .ranges(ranges)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_tool_name(opts.tool_name)
            .maybe_session_id(opts.session_id)
            .vcs_revision(vcs::git_revision());
        if let Some(url) = opts.transcript_url {
            builder = builder.metadata_entry("transcript_url", url);
        }
        self.trace_event(&builder.build());
        Ok(())
    }

    /// Trace a file creation; `line_count > 0` synthesizes the `1..=n` range
    pub fn trace_file_create(
        &self,
        file_path: &str,
        opts: FileCreateOptions,
    ) -> Result<(), ValidationError> {
        let ranges = if opts.line_count > 0 {
            vec![FileRange::new(1, opts.line_count.max(1))?]
        } else {
            Vec::new()
        };
        let event = TraceEvent::builder(EventType::FileCreate)
            .file_path(self.relative(file_path))
            .ranges(ranges)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_tool_name(opts.tool_name)
            .maybe_session_id(opts.session_id)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace a file deletion
    pub fn trace_file_delete(
        &self,
        file_path: &str,
        opts: FileDeleteOptions,
    ) -> Result<(), ValidationError> {
        let event = TraceEvent::builder(EventType::FileDelete)
            .file_path(self.relative(file_path))
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_tool_name(opts.tool_name)
            .maybe_session_id(opts.session_id)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace a coding session start
    pub fn trace_session_start(
        &self,
        session_id: &str,
        opts: SessionOptions,
    ) -> Result<(), ValidationError> {
        self.trace_session(EventType::SessionStart, session_id, opts)
    }

    /// Trace a coding session end
    pub fn trace_session_end(
        &self,
        session_id: &str,
        opts: SessionOptions,
    ) -> Result<(), ValidationError> {
        self.trace_session(EventType::SessionEnd, session_id, opts)
    }

    fn trace_session(
        &self,
        event_type: EventType,
        session_id: &str,
        opts: SessionOptions,
    ) -> Result<(), ValidationError> {
        let event = TraceEvent::builder(event_type)
            .session_id(session_id)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .metadata(opts.metadata)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace a code review over the given ranges
    pub fn trace_code_review(
        &self,
        file_path: &str,
        ranges: Vec<FileRange>,
        opts: CodeReviewOptions,
    ) -> Result<(), ValidationError> {
        let mut metadata = Metadata::new();
        if let Some(review_type) = opts.review_type {
            metadata.insert("review_type".into(), review_type.into());
        }
        if let Some(findings) = &opts.findings {
            metadata.insert("finding_count".into(), findings.len().into());
        }
        let event = TraceEvent::builder(EventType::CodeReview)
            .file_path(self.relative(file_path))
            .ranges(ranges)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_session_id(opts.session_id)
            .metadata(metadata)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace a code suggestion (autocomplete, inline suggestion)
    pub fn trace_code_suggestion(
        &self,
        file_path: &str,
        ranges: Vec<FileRange>,
        opts: SuggestionOptions,
    ) -> Result<(), ValidationError> {
        let mut metadata = Metadata::new();
        if let Some(suggestion_type) = opts.suggestion_type {
            metadata.insert("suggestion_type".into(), suggestion_type.into());
        }
        let event = TraceEvent::builder(EventType::CodeSuggest)
            .file_path(self.relative(file_path))
            .ranges(ranges)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_session_id(opts.session_id)
            .metadata(metadata)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace a refactoring
    pub fn trace_refactor(
        &self,
        file_path: &str,
        ranges: Vec<FileRange>,
        opts: RefactorOptions,
    ) -> Result<(), ValidationError> {
        let mut metadata = Metadata::new();
        if let Some(refactor_type) = opts.refactor_type {
            metadata.insert("refactor_type".into(), refactor_type.into());
        }
        let event = TraceEvent::builder(EventType::Refactor)
            .file_path(self.relative(file_path))
            .ranges(ranges)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_session_id(opts.session_id)
            .metadata(metadata)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace a debugging event
    pub fn trace_debug(
        &self,
        file_path: &str,
        ranges: Vec<FileRange>,
        opts: DebugOptions,
    ) -> Result<(), ValidationError> {
        let mut metadata = Metadata::new();
        metadata.insert("resolved".into(), opts.resolved.into());
        if let Some(issue_type) = opts.issue_type {
            metadata.insert("issue_type".into(), issue_type.into());
        }
        let event = TraceEvent::builder(EventType::Debug)
            .file_path(self.relative(file_path))
            .ranges(ranges)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_session_id(opts.session_id)
            .metadata(metadata)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace test generation
    pub fn trace_test_generate(
        &self,
        file_path: &str,
        ranges: Vec<FileRange>,
        opts: TestGenerateOptions,
    ) -> Result<(), ValidationError> {
        let mut metadata = Metadata::new();
        if let Some(framework) = opts.test_framework {
            metadata.insert("test_framework".into(), framework.into());
        }
        if let Some(count) = opts.test_count {
            metadata.insert("test_count".into(), count.into());
        }
        let event = TraceEvent::builder(EventType::TestGenerate)
            .file_path(self.relative(file_path))
            .ranges(ranges)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_session_id(opts.session_id)
            .metadata(metadata)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace a test execution
    pub fn trace_test_run(&self, opts: TestRunOptions) -> Result<(), ValidationError> {
        let mut metadata = Metadata::new();
        metadata.insert("passed".into(), opts.passed.into());
        metadata.insert("failed".into(), opts.failed.into());
        metadata.insert("skipped".into(), opts.skipped.into());
        metadata.insert(
            "total".into(),
            (opts.passed + opts.failed + opts.skipped).into(),
        );
        let mut builder = TraceEvent::builder(EventType::TestRun)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_session_id(opts.session_id)
            .metadata(metadata)
            .vcs_revision(vcs::git_revision());
        if let Some(test_file) = opts.test_file {
            builder = builder.file_path(self.relative(&test_file));
        }
        self.trace_event(&builder.build());
        Ok(())
    }

    /// Trace a terminal command execution
    pub fn trace_command_run(
        &self,
        command: &str,
        opts: CommandRunOptions,
    ) -> Result<(), ValidationError> {
        let mut metadata = Metadata::new();
        metadata.insert("command".into(), command.into());
        if let Some(exit_code) = opts.exit_code {
            metadata.insert("exit_code".into(), MetadataValue::Int(i64::from(exit_code)));
        }
        if let Some(working_dir) = opts.working_dir {
            metadata.insert("working_dir".into(), working_dir.into());
        }
        let event = TraceEvent::builder(EventType::CommandRun)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_session_id(opts.session_id)
            .metadata(metadata)
            .vcs_revision(vcs::git_revision())
            .build();
        self.trace_event(&event);
        Ok(())
    }

    /// Trace a custom event; the name lands in the `custom_event_name`
    /// metadata key
    pub fn trace_custom(&self, event_name: &str, opts: CustomOptions) -> Result<(), ValidationError> {
        let mut metadata = opts.metadata;
        metadata.insert("custom_event_name".into(), event_name.into());
        let mut builder = TraceEvent::builder(EventType::Custom)
            .ranges(opts.ranges)
            .contributor(Contributor::ai(opts.model.as_deref()))
            .maybe_session_id(opts.session_id)
            .metadata(metadata)
            .vcs_revision(vcs::git_revision());
        if let Some(file_path) = opts.file_path {
            builder = builder.file_path(self.relative(&file_path));
        }
        self.trace_event(&builder.build());
        Ok(())
    }

    /// Handle one hook payload from a host coding tool.
    ///
    /// Delegates to the hook adapter, then records the derived file edit.
    /// Declines are skips, never errors.
    pub fn handle_hook(&self, hook_input: &HookInput) -> HookStatus {
        let edit = match hook::file_edit_from_hook(hook_input) {
            Ok(edit) => edit,
            Err(reason) => {
                debug!(reason = %reason, "hook payload skipped");
                return HookStatus::Skipped(reason);
            }
        };
        let result = self.trace_file_edit(
            &edit.file_path,
            edit.ranges,
            FileEditOptions {
                model: edit.model,
                tool_name: Some(edit.tool_name),
                session_id: edit.session_id,
                transcript_url: edit.transcript_url,
            },
        );
        match result {
            Ok(()) => HookStatus::Recorded,
            Err(e) => HookStatus::Skipped(e.to_string()),
        }
    }

    /// Flush and close sink-held resources (graceful shutdown)
    pub fn shutdown(&self) {
        self.span_emitter.shutdown();
    }

    fn relative(&self, path: &str) -> String {
        vcs::to_relative_path(path, &self.workspace_root)
    }
}

/// Options for [`AgentTracer::trace_file_edit`]
#[derive(Debug, Clone, Default)]
pub struct FileEditOptions {
    pub model: Option<String>,
    pub tool_name: Option<String>,
    pub session_id: Option<String>,
    pub transcript_url: Option<String>,
}

/// Options for [`AgentTracer::trace_file_create`]
#[derive(Debug, Clone, Default)]
pub struct FileCreateOptions {
    pub model: Option<String>,
    pub tool_name: Option<String>,
    pub session_id: Option<String>,
    pub line_count: u32,
}

/// Options for [`AgentTracer::trace_file_delete`]
#[derive(Debug, Clone, Default)]
pub struct FileDeleteOptions {
    pub model: Option<String>,
    pub tool_name: Option<String>,
    pub session_id: Option<String>,
}

/// Options for session start/end traces
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub model: Option<String>,
    pub metadata: Metadata,
}

/// Options for [`AgentTracer::trace_code_review`]
#[derive(Debug, Clone, Default)]
pub struct CodeReviewOptions {
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub review_type: Option<String>,
    pub findings: Option<Vec<String>>,
}

/// Options for [`AgentTracer::trace_code_suggestion`]
#[derive(Debug, Clone, Default)]
pub struct SuggestionOptions {
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub suggestion_type: Option<String>,
}

/// Options for [`AgentTracer::trace_refactor`]
#[derive(Debug, Clone, Default)]
pub struct RefactorOptions {
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub refactor_type: Option<String>,
}

/// Options for [`AgentTracer::trace_debug`]
#[derive(Debug, Clone, Default)]
pub struct DebugOptions {
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub issue_type: Option<String>,
    pub resolved: bool,
}

/// Options for [`AgentTracer::trace_test_generate`]
#[derive(Debug, Clone, Default)]
pub struct TestGenerateOptions {
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub test_framework: Option<String>,
    pub test_count: Option<u32>,
}

/// Options for [`AgentTracer::trace_test_run`]
#[derive(Debug, Clone, Default)]
pub struct TestRunOptions {
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub test_file: Option<String>,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
}

/// Options for [`AgentTracer::trace_command_run`]
#[derive(Debug, Clone, Default)]
pub struct CommandRunOptions {
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub exit_code: Option<i32>,
    pub working_dir: Option<String>,
}

/// Options for [`AgentTracer::trace_custom`]
#[derive(Debug, Clone, Default)]
pub struct CustomOptions {
    pub file_path: Option<String>,
    pub ranges: Vec<FileRange>,
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub metadata: Metadata,
}

static GLOBAL_TRACER: Mutex<Option<Arc<AgentTracer>>> = Mutex::new(None);

/// Get the shared process-wide tracer.
///
/// The first call constructs it from the environment plus `overrides`;
/// subsequent calls return the same instance and ignore their overrides
/// until [`reset_global_tracer`] is called.
pub fn global_tracer(overrides: TracerOverrides) -> Result<Arc<AgentTracer>, ConfigError> {
    let mut guard = GLOBAL_TRACER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(tracer) = guard.as_ref() {
        return Ok(Arc::clone(tracer));
    }
    let config = TracerConfig::from_env().with_overrides(overrides);
    let tracer = Arc::new(AgentTracer::new(config)?);
    *guard = Some(Arc::clone(&tracer));
    Ok(tracer)
}

/// Drop the shared tracer so the next accessor call reconfigures.
///
/// Flushes the outgoing instance's sinks first.
pub fn reset_global_tracer() {
    let previous = GLOBAL_TRACER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    if let Some(tracer) = previous {
        tracer.shutdown();
    }
}
