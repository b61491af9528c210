use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracelens::{bootstrap, pipeline};
use tracelens_core::settings::HarvestSettings;

fn main() -> Result<()> {
    let settings = HarvestSettings::parse();
    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("analyze_harvest_logs v{} starting", env!("CARGO_PKG_VERSION"));

    let path = match settings.path {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("cannot read working directory")?;
            match bootstrap::discover_log(&cwd) {
                Some(path) => {
                    println!("Latest log file: {}\n", path.display());
                    path
                }
                None => {
                    println!("No log file found!");
                    println!("Usage: analyze_harvest_logs [path/to/session.jsonl]");
                    return Ok(());
                }
            }
        }
    };

    if !path.exists() {
        println!("File not found: {}", path.display());
        return Ok(());
    }

    let run = pipeline::harvest_run(&path)
        .with_context(|| format!("cannot analyze {}", path.display()))?;
    print!("{}", run.report);

    let output_dir = &settings.output_dir;
    let digest_path =
        pipeline::write_digest(&run.aggregates, output_dir, Local::now().naive_local())
            .with_context(|| format!("cannot save results to {}", output_dir.display()))?;
    println!("\nResults saved to: {}", digest_path.display());

    Ok(())
}
