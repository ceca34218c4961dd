//! OpenTelemetry span emitter
//!
//! Adapts one [`TraceEvent`] into a started-and-ended span carrying the
//! `agent_trace.*` semantic attributes. Configured backends (stdout console,
//! OTLP gRPC, Azure Application Insights) hang off one tracer provider as
//! independent span processors, so one backend's outage never blocks the
//! others.
//!
//! With no backends configured the emitter is inert and `emit` is a no-op.

#[cfg(feature = "otlp")]
use opentelemetry::{
    trace::{Span, SpanKind, Status, Tracer, TracerProvider as _},
    KeyValue, Value,
};
#[cfg(feature = "otlp")]
use opentelemetry_otlp::WithExportConfig;
#[cfg(feature = "otlp")]
use opentelemetry_sdk::{
    trace::{BatchSpanProcessor, SdkTracerProvider as TracerProvider},
    Resource,
};
#[cfg(feature = "otlp")]
use tracing::warn;

use crate::config::{ConfigError, TracerConfig};
#[cfg(feature = "otlp")]
use crate::event::MetadataValue;
use crate::event::TraceEvent;
#[cfg(feature = "otlp")]
use crate::semconv;

/// Span emitter over zero or more OTel backends
#[cfg(feature = "otlp")]
pub struct SpanEmitter {
    inner: Option<Inner>,
}

#[cfg(feature = "otlp")]
struct Inner {
    // Tokio runtime for the tonic OTLP channel; kept alive for the
    // exporter's lifetime. None when no network backend is configured.
    _runtime: Option<tokio::runtime::Runtime>,
    provider: TracerProvider,
    tracer: opentelemetry_sdk::trace::Tracer,
}

#[cfg(feature = "otlp")]
impl SpanEmitter {
    /// Build an emitter for the configured backends.
    ///
    /// Fails fast on unusable configuration; an empty backend set yields an
    /// inert emitter.
    pub fn new(config: &TracerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if !config.has_span_backends() {
            return Ok(Self { inner: None });
        }

        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .build();

        let mut builder = TracerProvider::builder().with_resource(resource);

        if config.console_export {
            builder = builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default());
        }

        if let Some(conn) = &config.azure_connection_string {
            let exporter = opentelemetry_application_insights::Exporter::new_from_connection_string(
                conn,
                reqwest::blocking::Client::new(),
            )
            .map_err(|e| ConfigError::InvalidConnectionString(e.to_string()))?;
            builder = builder.with_span_processor(BatchSpanProcessor::builder(exporter).build());
        }

        // The tonic channel must be created inside a tokio runtime context
        let runtime = if let Some(endpoint) = &config.otlp_endpoint {
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| ConfigError::SpanBackendInit(format!("tokio runtime: {e}")))?;
            let exporter = runtime
                .block_on(async {
                    opentelemetry_otlp::SpanExporter::builder()
                        .with_tonic()
                        .with_endpoint(endpoint)
                        .build()
                })
                .map_err(|e| {
                    ConfigError::SpanBackendInit(format!("OTLP exporter for {endpoint}: {e}"))
                })?;
            builder = builder.with_span_processor(BatchSpanProcessor::builder(exporter).build());
            Some(runtime)
        } else {
            None
        };

        let provider = builder.build();
        let tracer = provider.tracer("agent-trace");

        Ok(Self {
            inner: Some(Inner {
                _runtime: runtime,
                provider,
                tracer,
            }),
        })
    }

    /// Whether any backend is active
    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Emit one event as a span named `agent.<event_type>`.
    ///
    /// The span is started and ended before this returns; no span survives
    /// across calls. Backend delivery failures stay inside the SDK's
    /// processors and never surface here.
    pub fn emit(&self, event: &TraceEvent) {
        let Some(inner) = &self.inner else {
            return;
        };

        let mut attributes = vec![
            KeyValue::new(semconv::ATTR_EVENT_TYPE, event.event_type().as_str()),
            KeyValue::new(
                semconv::ATTR_CONTRIBUTOR_TYPE,
                event.contributor().contributor_type().as_str(),
            ),
        ];

        if let Some(model_id) = event.contributor().model_id() {
            attributes.push(KeyValue::new(semconv::ATTR_MODEL_ID, model_id.to_string()));
        }
        if let Some(path) = event.file_path() {
            attributes.push(KeyValue::new(semconv::ATTR_FILE_PATH, path.to_string()));
        }
        if let Some(tool) = event.tool_name() {
            attributes.push(KeyValue::new(semconv::ATTR_TOOL_NAME, tool.to_string()));
        }
        if let Some(session) = event.session_id() {
            attributes.push(KeyValue::new(semconv::ATTR_SESSION_ID, session.to_string()));
        }
        if let Some(revision) = event.vcs_revision() {
            attributes.push(KeyValue::new(
                semconv::ATTR_VCS_REVISION,
                revision.to_string(),
            ));
        }

        // Ranges flatten to one attribute pair per index
        for (i, range) in event.ranges().iter().enumerate() {
            attributes.push(KeyValue::new(
                semconv::range_start_attr(i),
                i64::from(range.start_line()),
            ));
            attributes.push(KeyValue::new(
                semconv::range_end_attr(i),
                i64::from(range.end_line()),
            ));
            if let Some(hash) = range.content_hash() {
                attributes.push(KeyValue::new(
                    semconv::range_content_hash_attr(i),
                    hash.to_string(),
                ));
            }
        }

        for (key, value) in event.metadata() {
            attributes.push(KeyValue::new(
                format!("{}{key}", semconv::ATTR_METADATA_PREFIX),
                otel_value(value),
            ));
        }

        let mut span = inner
            .tracer
            .span_builder(format!("agent.{}", event.event_type().as_str()))
            .with_kind(SpanKind::Internal)
            .with_attributes(attributes)
            .start(&inner.tracer);

        span.set_status(Status::Ok);
        span.end();
    }

    /// Flush pending spans and shut the provider down
    pub fn shutdown(&self) {
        if let Some(inner) = &self.inner {
            if let Err(e) = inner.provider.force_flush() {
                warn!(error = %e, "failed to flush span processors");
            }
            if let Err(e) = inner.provider.shutdown() {
                warn!(error = %e, "failed to shut down span provider");
            }
        }
    }
}

#[cfg(feature = "otlp")]
fn otel_value(value: &MetadataValue) -> Value {
    match value {
        MetadataValue::Bool(b) => Value::Bool(*b),
        MetadataValue::Int(i) => Value::I64(*i),
        MetadataValue::Float(f) => Value::F64(*f),
        MetadataValue::Str(s) => Value::String(s.clone().into()),
    }
}

// Stub implementation when the otlp feature is disabled
#[cfg(not(feature = "otlp"))]
pub struct SpanEmitter;

#[cfg(not(feature = "otlp"))]
impl SpanEmitter {
    pub fn new(config: &TracerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.has_span_backends() {
            return Err(ConfigError::SpanExportUnavailable);
        }
        Ok(Self)
    }

    pub fn is_active(&self) -> bool {
        false
    }

    pub fn emit(&self, _event: &TraceEvent) {}

    pub fn shutdown(&self) {}
}
