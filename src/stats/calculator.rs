//! Statistics Calculator Module
//! Handles the dataset overview: per-column info and descriptive statistics
//! for numeric columns.

use crate::data::DataLoader;
use crate::error::Result;
use polars::prelude::*;
use statrs::statistics::Statistics;

/// Dtype and non-null count of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: String,
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self {
            name: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Handles statistical calculations over the raw table.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Column name, dtype and non-null count for every column.
    pub fn column_info(df: &DataFrame) -> Vec<ColumnInfo> {
        df.get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                non_null: col.len() - col.null_count(),
                dtype: col.dtype().to_string(),
            })
            .collect()
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        ColumnSummary {
            name: String::new(),
            count: n,
            mean: values.iter().mean(),
            // Sample standard deviation; NaN for a single value
            std: values.iter().std_dev(),
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Descriptive statistics for every numeric column, nulls skipped.
    pub fn describe(df: &DataFrame) -> Result<Vec<ColumnSummary>> {
        DataLoader::get_numeric_columns(df)
            .into_iter()
            .map(|name| {
                let column = df.column(&name)?.cast(&DataType::Float64)?;
                let values: Vec<f64> = column.f64()?.into_iter().flatten().collect();
                let mut summary = Self::compute_descriptive_stats(&values);
                summary.name = name;
                Ok(summary)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_descriptive_stats_match_linear_quantiles() {
        let s = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert!(approx(s.mean, 2.5));
        assert!(approx(s.std, (5.0f64 / 3.0).sqrt()));
        assert!(approx(s.min, 1.0));
        assert!(approx(s.p25, 1.75));
        assert!(approx(s.median, 2.5));
        assert!(approx(s.p75, 3.25));
        assert!(approx(s.max, 4.0));
    }

    #[test]
    fn test_empty_and_single_value() {
        assert!(StatsCalculator::compute_descriptive_stats(&[]).mean.is_nan());

        let single = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(single.count, 1);
        assert!(approx(single.median, 7.0));
        assert!(single.std.is_nan());
    }

    #[test]
    fn test_nan_values_sort_last() {
        let values: Vec<f64> = (0..30).rev().map(f64::from).chain([f64::NAN]).collect();
        let s = StatsCalculator::compute_descriptive_stats(&values);
        assert!(approx(s.min, 0.0));
        assert!(s.max.is_nan());
    }

    #[test]
    fn test_describe_skips_text_and_nulls() {
        let df = DataLoader::parse_csv_bytes(b"Region,Sales\nWest,1.0\nEast,\nSouth,3.0\n".to_vec())
            .unwrap();
        let summaries = StatsCalculator::describe(&df).unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "Sales");
        assert_eq!(summaries[0].count, 2);
        assert!(approx(summaries[0].mean, 2.0));
    }

    #[test]
    fn test_column_info_counts_non_null() {
        let df = DataLoader::parse_csv_bytes(b"Region,Sales\nWest,1.0\n,2.0\n".to_vec()).unwrap();
        let info = StatsCalculator::column_info(&df);
        assert_eq!(info[0].name, "Region");
        assert_eq!(info[0].non_null, 1);
        assert_eq!(info[1].non_null, 2);
    }
}
