//! CLI argument parsing for the hook entrypoint

use std::path::PathBuf;

use clap::Parser;

use crate::config::TracerOverrides;

#[derive(Parser, Debug)]
#[command(name = "agent-trace")]
#[command(version)]
#[command(
    about = "Record AI code attribution from hook payloads on stdin",
    long_about = None
)]
pub struct Cli {
    /// OTLP gRPC endpoint for span export (e.g. http://localhost:4317)
    #[arg(long = "otlp-endpoint", value_name = "URL")]
    pub otlp_endpoint: Option<String>,

    /// Azure Application Insights connection string
    #[arg(long = "azure-connection-string", value_name = "CONN")]
    pub azure_connection_string: Option<String>,

    /// Export spans to stdout (for debugging)
    #[arg(long = "console-export")]
    pub console_export: bool,

    /// Disable the JSONL trace file
    #[arg(long = "no-file-export")]
    pub no_file_export: bool,

    /// Trace file path (default: .agent-trace/traces.jsonl under the repo root)
    #[arg(long = "trace-file", value_name = "PATH")]
    pub trace_file: Option<PathBuf>,

    /// Enable trace-level diagnostics on stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Map flags to tracer overrides.
    ///
    /// The hook entrypoint forces file export on and console export off
    /// unless flags say otherwise, so environment settings meant for other
    /// integrations cannot silently disable the durable record.
    pub fn overrides(&self) -> TracerOverrides {
        TracerOverrides {
            console_export: Some(self.console_export),
            file_export: Some(!self.no_file_export),
            otlp_endpoint: self.otlp_endpoint.clone(),
            azure_connection_string: self.azure_connection_string.clone(),
            trace_file: self.trace_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["agent-trace"]);
        assert!(!cli.console_export);
        assert!(!cli.no_file_export);
        assert!(cli.otlp_endpoint.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_otlp_endpoint() {
        let cli = Cli::parse_from(["agent-trace", "--otlp-endpoint", "http://localhost:4317"]);
        assert_eq!(
            cli.otlp_endpoint.as_deref(),
            Some("http://localhost:4317")
        );
    }

    #[test]
    fn test_overrides_force_file_export() {
        let cli = Cli::parse_from(["agent-trace"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.file_export, Some(true));
        assert_eq!(overrides.console_export, Some(false));
    }

    #[test]
    fn test_no_file_export_flag() {
        let cli = Cli::parse_from(["agent-trace", "--no-file-export"]);
        assert_eq!(cli.overrides().file_export, Some(false));
    }

    #[test]
    fn test_trace_file_override() {
        let cli = Cli::parse_from(["agent-trace", "--trace-file", "/tmp/t.jsonl"]);
        assert_eq!(
            cli.overrides().trace_file,
            Some(PathBuf::from("/tmp/t.jsonl"))
        );
    }
}
