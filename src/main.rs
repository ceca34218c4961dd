use std::io::Read;

use anyhow::Result;
use clap::Parser;

use agent_trace::cli::Cli;
use agent_trace::hook::HookInput;
use agent_trace::tracer::global_tracer;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    } else {
        // Sink failures surface as warn-level diagnostics; keep them visible
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Process one hook payload from stdin.
///
/// Malformed input and uninteresting hook events exit 0: the hosting tool's
/// workflow must never break because tracing declined. Misconfiguration
/// (bad connection string, unreachable exporter setup) still fails fast,
/// since that is an integration error worth surfacing.
fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        warn!(error = %e, "failed to read hook payload from stdin");
        return Ok(());
    }
    let input = input.trim();
    if input.is_empty() {
        return Ok(());
    }

    let hook_input: HookInput = match serde_json::from_str(input) {
        Ok(hook) => hook,
        Err(e) => {
            warn!(error = %e, "invalid hook payload JSON");
            return Ok(());
        }
    };

    let tracer = global_tracer(args.overrides())?;
    let status = tracer.handle_hook(&hook_input);
    debug!(?status, "hook processed");
    tracer.shutdown();
    Ok(())
}
