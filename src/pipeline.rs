//! Pipeline Module
//! Load, clean, aggregate, render, in that order. Any error aborts the run.

use crate::charts::StaticChartRenderer;
use crate::config::AnalysisConfig;
use crate::data::{DataLoader, DataProcessor};
use crate::error::Result;
use crate::report::Report;
use crate::stats::{SalesAggregator, StatsCalculator};
use log::info;
use polars::prelude::*;
use std::time::Instant;

/// Clean and aggregate an already loaded table. No files are written.
pub fn analyze(raw: DataFrame, config: &AnalysisConfig) -> Result<Report> {
    let rows = raw.height();
    let columns = raw.width();
    let head = raw.head(Some(config.preview_rows));
    let info = StatsCalculator::column_info(&raw);
    let summary = StatsCalculator::describe(&raw)?;

    let start = Instant::now();
    let (df, cleaning) = DataProcessor::clean(raw)?;
    info!("Cleaning finished in {:?}", start.elapsed());

    let start = Instant::now();
    let aggregates = SalesAggregator::compute(&df)?;
    let insights = SalesAggregator::key_insights(&df, &aggregates)?;
    info!("Aggregation finished in {:?}", start.elapsed());

    Ok(Report {
        rows,
        columns,
        head,
        info,
        summary,
        cleaning,
        aggregates,
        charts: Vec::new(),
        insights,
    })
}

/// Run the whole analysis described by `config`.
pub fn run(config: &AnalysisConfig) -> Result<Report> {
    let raw = DataLoader::load_csv(&config.input_path)?;
    let mut report = analyze(raw, config)?;

    let start = Instant::now();
    let renderer = StaticChartRenderer::new(config.style.clone());
    report.charts = renderer.render_all(&report.aggregates, &config.output_dir)?;
    info!(
        "Rendered {} charts into {} in {:?}",
        report.charts.len(),
        config.output_dir.display(),
        start.elapsed()
    );

    Ok(report)
}
