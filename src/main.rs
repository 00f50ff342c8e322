//! Superstore Sales Analysis - command line entry point
//!
//! Report on stdout, logs on stderr (`RUST_LOG` overrides the `info` default).

use anyhow::Context;
use log::info;
use sales_analysis::{AnalysisConfig, Reporter};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::from_env().context("loading configuration")?;
    info!(
        "Analysing {} into {}",
        config.input_path.display(),
        config.output_dir.display()
    );

    let start = Instant::now();
    let report = sales_analysis::run(&config)
        .with_context(|| format!("analysis of {} failed", config.input_path.display()))?;
    Reporter::print(&report).context("writing report to stdout")?;

    info!("Finished in {:?}", start.elapsed());
    Ok(())
}
