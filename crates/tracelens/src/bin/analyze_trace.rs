use anyhow::{Context, Result};
use clap::Parser;
use tracelens::{bootstrap, pipeline};
use tracelens_core::settings::TraceSettings;

fn main() -> Result<()> {
    let settings = TraceSettings::parse();
    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("analyze_trace v{} starting", env!("CARGO_PKG_VERSION"));

    let report = pipeline::trace_report(&settings.path)
        .with_context(|| format!("cannot analyze {}", settings.path.display()))?;
    print!("{}", report);

    Ok(())
}
