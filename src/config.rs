//! Tracer configuration
//!
//! Resolution order: explicit overrides beat environment variables beat
//! defaults. Environment is read once, when the config is built; the tracer
//! never re-reads it per event. Unusable configuration (a malformed Azure
//! connection string, span backends requested without the `otlp` feature) is
//! rejected at tracer construction, not on first event.

use std::path::PathBuf;

use thiserror::Error;

use crate::semconv;

/// Errors for tracer configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed Application Insights connection string: {0}")]
    InvalidConnectionString(String),

    #[error("failed to initialize span backend: {0}")]
    SpanBackendInit(String),

    #[error("span export requested but the 'otlp' feature is disabled")]
    SpanExportUnavailable,
}

/// Process-wide tracer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerConfig {
    /// Service name for the OTel resource
    pub service_name: String,
    /// Export spans to stdout (debugging)
    pub console_export: bool,
    /// Append events to the JSONL trace file
    pub file_export: bool,
    /// OTLP gRPC endpoint (e.g. "http://localhost:4317")
    pub otlp_endpoint: Option<String>,
    /// Azure Application Insights connection string
    pub azure_connection_string: Option<String>,
    /// Trace file override; defaults to `.agent-trace/traces.jsonl` under the
    /// workspace root
    pub trace_file: Option<PathBuf>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            service_name: semconv::SERVICE_NAME.to_string(),
            console_export: false,
            file_export: true,
            otlp_endpoint: None,
            azure_connection_string: None,
            trace_file: None,
        }
    }
}

impl TracerConfig {
    /// Build a config from the `AGENT_TRACE_*` environment variables
    pub fn from_env() -> Self {
        Self {
            service_name: semconv::SERVICE_NAME.to_string(),
            console_export: env_bool(semconv::ENV_CONSOLE_EXPORT, false),
            file_export: env_bool(semconv::ENV_FILE_EXPORT, true),
            otlp_endpoint: env_string(semconv::ENV_OTLP_ENDPOINT),
            azure_connection_string: env_string(semconv::ENV_AZURE_CONNECTION_STRING),
            trace_file: None,
        }
    }

    /// Apply explicit overrides on top of this config
    pub fn with_overrides(mut self, overrides: TracerOverrides) -> Self {
        if let Some(console) = overrides.console_export {
            self.console_export = console;
        }
        if let Some(file) = overrides.file_export {
            self.file_export = file;
        }
        if overrides.otlp_endpoint.is_some() {
            self.otlp_endpoint = overrides.otlp_endpoint;
        }
        if overrides.azure_connection_string.is_some() {
            self.azure_connection_string = overrides.azure_connection_string;
        }
        if overrides.trace_file.is_some() {
            self.trace_file = overrides.trace_file;
        }
        self
    }

    /// Whether any span backend is enabled
    pub fn has_span_backends(&self) -> bool {
        self.console_export || self.otlp_endpoint.is_some() || self.azure_connection_string.is_some()
    }

    /// Fail fast on statically detectable misconfiguration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(conn) = &self.azure_connection_string {
            validate_connection_string(conn)?;
        }
        Ok(())
    }
}

/// Explicit per-call overrides for the global tracer accessor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracerOverrides {
    pub console_export: Option<bool>,
    pub file_export: Option<bool>,
    pub otlp_endpoint: Option<String>,
    pub azure_connection_string: Option<String>,
    pub trace_file: Option<PathBuf>,
}

/// Check an Application Insights connection string: `key=value` pairs joined
/// by `;`, including an `InstrumentationKey`.
pub fn validate_connection_string(conn: &str) -> Result<(), ConfigError> {
    if conn.trim().is_empty() {
        return Err(ConfigError::InvalidConnectionString(
            "empty string".to_string(),
        ));
    }
    let mut has_instrumentation_key = false;
    for part in conn.split(';').filter(|p| !p.trim().is_empty()) {
        let Some((key, value)) = part.split_once('=') else {
            return Err(ConfigError::InvalidConnectionString(format!(
                "segment '{part}' is not key=value"
            )));
        };
        if key.trim().eq_ignore_ascii_case("instrumentationkey") && !value.trim().is_empty() {
            has_instrumentation_key = true;
        }
    }
    if !has_instrumentation_key {
        return Err(ConfigError::InvalidConnectionString(
            "missing InstrumentationKey".to_string(),
        ));
    }
    Ok(())
}

/// Boolean env var: `true`/`1`/`yes` (case-insensitive) are true, anything
/// else is false, absent means the default.
pub fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
