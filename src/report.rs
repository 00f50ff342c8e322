//! Report Module
//! Formats the analysis as the plain-text report printed to stdout.

use crate::data::CleaningSummary;
use crate::format::{currency, with_thousands};
use crate::stats::{
    ColumnInfo, ColumnSummary, GroupTotal, KeyInsights, SalesAggregates, TOP_N,
};
use polars::prelude::DataFrame;
use std::io::{self, Write};
use std::path::PathBuf;

const RULE_WIDTH: usize = 60;

/// Everything the report prints, gathered by the pipeline.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: usize,
    pub columns: usize,
    pub head: DataFrame,
    pub info: Vec<ColumnInfo>,
    pub summary: Vec<ColumnSummary>,
    pub cleaning: CleaningSummary,
    pub aggregates: SalesAggregates,
    pub charts: Vec<PathBuf>,
    pub insights: KeyInsights,
}

/// Writes a [`Report`] in its fixed section order.
pub struct Reporter;

impl Reporter {
    pub fn print(report: &Report) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        Self::write(report, &mut out)?;
        out.flush()
    }

    pub fn write<W: Write>(report: &Report, out: &mut W) -> io::Result<()> {
        let banner = "=".repeat(RULE_WIDTH);
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(out, "{banner}")?;
        writeln!(out, "SUPERSTORE SALES DATA ANALYSIS")?;
        writeln!(out, "{banner}")?;
        writeln!(out)?;

        writeln!(out, "Step 1: Loading data...")?;
        writeln!(
            out,
            "✓ Data loaded successfully: {} rows, {} columns",
            report.rows, report.columns
        )?;
        writeln!(out)?;

        writeln!(out, "Step 2: Initial Data Exploration")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "First few rows:")?;
        writeln!(out, "{}", report.head)?;
        writeln!(out)?;
        writeln!(out, "Dataset Info:")?;
        Self::write_info(out, &report.info)?;
        writeln!(out)?;
        writeln!(out, "Statistical Summary:")?;
        Self::write_summary(out, &report.summary)?;
        writeln!(out)?;

        writeln!(out, "Step 3: Data Cleaning")?;
        writeln!(out, "{rule}")?;
        Self::write_cleaning(out, &report.cleaning)?;
        writeln!(out)?;

        writeln!(out, "Step 4: Data Analysis")?;
        writeln!(out, "{rule}")?;
        Self::write_aggregates(out, &report.aggregates)?;

        writeln!(out, "Step 5: Creating Visualizations")?;
        writeln!(out, "{rule}")?;
        for path in &report.charts {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            writeln!(out, "✓ Created: {name}")?;
        }
        writeln!(out)?;
        writeln!(out, "{banner}")?;
        writeln!(out, "ANALYSIS COMPLETE!")?;
        writeln!(out, "{banner}")?;

        Self::write_insights(out, &report.insights)
    }

    fn write_info<W: Write>(out: &mut W, info: &[ColumnInfo]) -> io::Result<()> {
        let width = info.iter().map(|c| c.name.len()).max().unwrap_or(6).max(6);
        writeln!(out, " #   {:<width$}  Non-Null Count  Dtype", "Column")?;
        for (i, column) in info.iter().enumerate() {
            writeln!(
                out,
                " {:<3} {:<width$}  {:>5} non-null  {}",
                i, column.name, column.non_null, column.dtype
            )?;
        }
        Ok(())
    }

    fn write_summary<W: Write>(out: &mut W, summary: &[ColumnSummary]) -> io::Result<()> {
        if summary.is_empty() {
            return writeln!(out, "No numeric columns.");
        }
        let width = summary.iter().map(|s| s.name.len()).max().unwrap_or(0).max(14);

        write!(out, "{:<6}", "")?;
        for column in summary {
            write!(out, " {:>width$}", column.name)?;
        }
        writeln!(out)?;

        let rows: [(&str, fn(&ColumnSummary) -> f64); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.p25),
            ("50%", |s| s.median),
            ("75%", |s| s.p75),
            ("max", |s| s.max),
        ];
        for (label, value) in rows {
            write!(out, "{label:<6}")?;
            for column in summary {
                write!(out, " {:>width$.4}", value(column))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_cleaning<W: Write>(out: &mut W, cleaning: &CleaningSummary) -> io::Result<()> {
        writeln!(out, "Missing values per column:")?;
        let missing: Vec<&(String, usize)> = cleaning.columns_with_nulls().collect();
        if missing.is_empty() {
            writeln!(out, "No missing values found!")?;
        } else {
            let width = missing.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, count) in missing {
                writeln!(out, "{name:<width$}  {count}")?;
            }
        }
        writeln!(out)?;

        writeln!(out, "Duplicate rows: {}", cleaning.duplicates_removed)?;
        if cleaning.duplicates_removed > 0 {
            writeln!(out, "✓ Removed {} duplicate rows", cleaning.duplicates_removed)?;
        }
        writeln!(out)?;

        writeln!(out, "Converting date columns to datetime format...")?;
        writeln!(out, "✓ Date conversion complete")?;
        if cleaning.ship_before_order > 0 {
            writeln!(
                out,
                "Note: {} rows have a Ship Date before their Order Date",
                cleaning.ship_before_order
            )?;
        }
        writeln!(out, "✓ Created Year, Month, Quarter columns")
    }

    fn write_aggregates<W: Write>(out: &mut W, aggregates: &SalesAggregates) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "1. Total Sales by Category:")?;
        Self::write_totals(out, "Category", &aggregates.by_category)?;
        writeln!(out, "2. Total Sales by Region:")?;
        Self::write_totals(out, "Region", &aggregates.by_region)?;
        writeln!(out, "3. Total Sales by Customer Segment:")?;
        Self::write_totals(out, "Segment", &aggregates.by_segment)?;
        writeln!(out, "4. Top {TOP_N} Products by Sales:")?;
        Self::write_totals(out, "Product Name", &aggregates.top_products)?;
        writeln!(out, "5. Sales by Year:")?;
        Self::write_totals(out, "Year", &aggregates.by_year)?;
        writeln!(
            out,
            "6. Average Order Value: ${:.2}",
            aggregates.average_order_value
        )?;
        writeln!(out)?;
        writeln!(out, "7. Top {TOP_N} Sub-Categories by Sales:")?;
        Self::write_totals(out, "Sub-Category", &aggregates.top_sub_categories)?;

        writeln!(out, "8. Monthly Sales:")?;
        let monthly: Vec<GroupTotal> = aggregates
            .monthly
            .iter()
            .map(|m| GroupTotal {
                label: m.label(),
                sales: m.sales,
            })
            .collect();
        Self::write_totals(out, "Order Date", &monthly)
    }

    /// Key name, then one `label  value` line per group and a blank line.
    fn write_totals<W: Write>(out: &mut W, key: &str, totals: &[GroupTotal]) -> io::Result<()> {
        let width = totals
            .iter()
            .map(|g| g.label.chars().count())
            .max()
            .unwrap_or(0)
            .max(key.len());
        writeln!(out, "{key}")?;
        for group in totals {
            writeln!(out, "{:<width$}  {:>14.4}", group.label, group.sales)?;
        }
        writeln!(out)
    }

    fn write_insights<W: Write>(out: &mut W, insights: &KeyInsights) -> io::Result<()> {
        let leader = |group: &Option<GroupTotal>| match group {
            Some(g) => format!("{} ({})", g.label, currency(g.sales)),
            None => "n/a".to_string(),
        };

        writeln!(out)?;
        writeln!(out, "KEY INSIGHTS:")?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(out, "1. Total Revenue: {}", currency(insights.total_revenue))?;
        writeln!(
            out,
            "2. Total Orders: {}",
            with_thousands(insights.total_orders as f64, 0)
        )?;
        writeln!(
            out,
            "3. Total Customers: {}",
            with_thousands(insights.total_customers as f64, 0)
        )?;
        writeln!(
            out,
            "4. Average Order Value: ${:.2}",
            insights.average_order_value
        )?;
        writeln!(out, "5. Most Profitable Category: {}", leader(&insights.top_category))?;
        writeln!(out, "6. Best Region: {}", leader(&insights.top_region))?;
        writeln!(out, "7. Top Customer Segment: {}", leader(&insights.top_segment))?;
        match insights.date_range {
            Some((first, last)) => writeln!(
                out,
                "8. Date Range: {} to {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            )?,
            None => writeln!(out, "8. Date Range: n/a")?,
        }
        writeln!(out)?;
        writeln!(out, "All visualizations saved!")?;
        writeln!(out, "Project complete! ✓")
    }
}
