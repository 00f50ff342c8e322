//! Data Processor Module
//! Handles data cleaning: schema check, null scan, deduplication, type
//! normalisation, date parsing and the derived Year/Month/Quarter columns.

use crate::data::schema::*;
use crate::error::{AnalysisError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use log::{debug, info, warn};
use polars::prelude::*;

/// What the cleaning pass found and changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningSummary {
    /// Null count for every input column, in column order.
    pub missing_values: Vec<(String, usize)>,
    pub duplicates_removed: usize,
    /// Rows whose Ship Date precedes their Order Date. Not rejected.
    pub ship_before_order: usize,
}

impl CleaningSummary {
    pub fn columns_with_nulls(&self) -> impl Iterator<Item = &(String, usize)> {
        self.missing_values.iter().filter(|(_, n)| *n > 0)
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Run every cleaning step, replacing the table with its cleaned version.
    pub fn clean(df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        Self::check_schema(&df)?;
        Self::check_numeric_column(&df, SALES)?;

        let missing_values = Self::missing_values(&df);
        let (df, duplicates_removed) = Self::drop_duplicates(df)?;
        let mut df = Self::normalize_types(df)?;
        let ship_before_order = Self::add_date_columns(&mut df)?;

        info!(
            "Cleaned table: {} rows after removing {} duplicates",
            df.height(),
            duplicates_removed
        );

        Ok((
            df,
            CleaningSummary {
                missing_values,
                duplicates_removed,
                ship_before_order,
            },
        ))
    }

    /// Fail on the first required column that is absent.
    pub fn check_schema(df: &DataFrame) -> Result<()> {
        let names = df.get_column_names();
        for required in REQUIRED_COLUMNS {
            if !names.iter().any(|name| name.as_str() == required) {
                return Err(AnalysisError::Schema(required.to_string()));
            }
        }
        Ok(())
    }

    /// Fail on the first non-null value of `name` that is not a number.
    pub fn check_numeric_column(df: &DataFrame, name: &str) -> Result<()> {
        let original = df.column(name)?;
        let numbers = original.cast(&DataType::Float64)?;
        if numbers.null_count() == original.null_count() {
            return Ok(());
        }

        let text = original.cast(&DataType::String)?;
        let rejected = text
            .str()?
            .into_iter()
            .zip(numbers.f64()?.into_iter())
            .enumerate()
            .find_map(|(row, pair)| match pair {
                (Some(s), None) => Some((row, s.to_string())),
                _ => None,
            });

        match rejected {
            Some((row, s)) => Err(AnalysisError::Parse(format!(
                "column '{name}', row {}: '{s}' is not a number",
                row + 1
            ))),
            None => Ok(()),
        }
    }

    /// Count null values per column.
    pub fn missing_values(df: &DataFrame) -> Vec<(String, usize)> {
        df.get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect()
    }

    /// Drop rows identical to an earlier row, keeping the first occurrence.
    pub fn drop_duplicates(df: DataFrame) -> Result<(DataFrame, usize)> {
        let before = df.height();
        let unique = df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        let removed = before - unique.height();
        debug!("Duplicate rows removed: {}", removed);
        Ok((unique, removed))
    }

    /// Cast Sales to Float64 and the identifier/categorical columns to String.
    pub fn normalize_types(df: DataFrame) -> Result<DataFrame> {
        let mut exprs: Vec<Expr> = TEXT_COLUMNS
            .iter()
            .map(|name| col(*name).cast(DataType::String))
            .collect();
        exprs.push(col(SALES).cast(DataType::Float64));

        Ok(df.lazy().with_columns(exprs).collect()?)
    }

    /// Parse one `dd/mm/yyyy` value.
    pub fn parse_date(text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
    }

    /// Format a date back to `dd/mm/yyyy`.
    pub fn format_date(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a text column of dates. Nulls stay null; any other unparseable
    /// value aborts with its column, 1-based data row and text.
    pub fn parse_date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
        let text = df.column(name)?.cast(&DataType::String)?;
        let ca = text.str()?;

        ca.into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(s) => Self::parse_date(s).map(Some).ok_or_else(|| {
                    AnalysisError::Parse(format!(
                        "column '{name}', row {}: '{s}' does not match day/month/year",
                        row + 1
                    ))
                }),
            })
            .collect()
    }

    /// Build a Date series from parsed values.
    pub fn date_series(name: &str, dates: &[Option<NaiveDate>]) -> Result<Series> {
        let days: Vec<Option<i32>> = dates
            .iter()
            .map(|d| d.map(|d| (d - epoch()).num_days() as i32))
            .collect();
        Ok(Series::new(name.into(), days).cast(&DataType::Date)?)
    }

    /// Read a Date column back into calendar dates.
    pub fn read_date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
        let days = df.column(name)?.cast(&DataType::Int32)?;
        let ca = days.i32()?;
        Ok(ca
            .into_iter()
            .map(|d| d.map(|d| epoch() + Duration::days(d as i64)))
            .collect())
    }

    /// Replace both date columns with parsed dates and append Year, Month and
    /// Quarter. Returns the number of rows shipped before they were ordered.
    pub fn add_date_columns(df: &mut DataFrame) -> Result<usize> {
        let order_dates = Self::parse_date_column(df, ORDER_DATE)?;
        let ship_dates = Self::parse_date_column(df, SHIP_DATE)?;

        let ship_before_order = order_dates
            .iter()
            .zip(&ship_dates)
            .filter(|(o, s)| matches!((o, s), (Some(o), Some(s)) if s < o))
            .count();
        if ship_before_order > 0 {
            warn!("{} rows have a Ship Date before their Order Date", ship_before_order);
        }

        let years: Vec<Option<i32>> = order_dates.iter().map(|d| d.map(|d| d.year())).collect();
        let months: Vec<Option<i32>> = order_dates
            .iter()
            .map(|d| d.map(|d| d.month() as i32))
            .collect();
        let quarters: Vec<Option<i32>> = months.iter().map(|m| m.map(quarter_of)).collect();

        df.with_column(Self::date_series(ORDER_DATE, &order_dates)?)?;
        df.with_column(Self::date_series(SHIP_DATE, &ship_dates)?)?;
        df.with_column(Series::new(YEAR.into(), years))?;
        df.with_column(Series::new(MONTH.into(), months))?;
        df.with_column(Series::new(QUARTER.into(), quarters))?;

        debug!("Date columns parsed; Year, Month, Quarter added");
        Ok(ship_before_order)
    }
}

/// Quarter 1-4 of a month 1-12, i.e. ceil(month / 3).
pub fn quarter_of(month: i32) -> i32 {
    (month + 2) / 3
}
