//! Agent Trace - AI code attribution tracing
//!
//! This library captures attribution metadata (which model, which file, which
//! line ranges, in which session) for software-change events and fans each
//! event out to multiple observability sinks: an OpenTelemetry span per event
//! plus a durable JSONL record under `.agent-trace/traces.jsonl`.

pub mod cli;
pub mod config;
pub mod event;
pub mod file_sink;
pub mod hook;
pub mod model_id;
pub mod semconv;
pub mod span_emitter;
pub mod tracer;
pub mod vcs;

pub use config::{ConfigError, TracerConfig, TracerOverrides};
pub use event::{
    Contributor, ContributorType, EventType, FileRange, Metadata, MetadataValue, TraceEvent,
    ValidationError,
};
pub use hook::{HookInput, HookStatus};
pub use tracer::{global_tracer, reset_global_tracer, AgentTracer};
