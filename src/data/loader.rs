//! CSV Data Loader Module
//! Handles CSV file loading using Polars, after a structural pass with `csv`.

use crate::error::{AnalysisError, Result};
use log::{debug, info};
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Rows scanned by Polars when inferring column dtypes.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Field texts read as missing, in addition to empty fields.
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Loads the sales table from delimited text.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file using Polars.
    pub fn load_csv(file_path: &Path) -> Result<DataFrame> {
        info!("Loading data from {}", file_path.display());
        let bytes = fs::read(file_path).map_err(|e| AnalysisError::file_access(file_path, e))?;
        debug!("Read {} bytes", bytes.len());

        Self::parse_csv_bytes(bytes)
    }

    /// Parse an in-memory CSV document with a header row.
    pub fn parse_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
        Self::check_field_counts(&bytes)?;

        let null_values: Vec<PlSmallStr> = NA_TOKENS
            .into_iter()
            .map(PlSmallStr::from_static)
            .collect();
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_parse_options(
                CsvParseOptions::default()
                    .with_null_values(Some(NullValues::AllColumns(null_values))),
            )
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| AnalysisError::Parse(format!("malformed CSV: {e}")))?;

        info!("Loaded {} rows, {} columns", df.height(), df.width());
        Ok(df)
    }

    /// Reject records whose field count differs from the header.
    fn check_field_counts(bytes: &[u8]) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        for record in reader.byte_records() {
            record.map_err(|e| AnalysisError::Parse(e.to_string()))?;
        }
        Ok(())
    }

    /// Get list of numeric column names.
    pub fn get_numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| {
                matches!(
                    col.dtype(),
                    DataType::Float32
                        | DataType::Float64
                        | DataType::Int8
                        | DataType::Int16
                        | DataType::Int32
                        | DataType::Int64
                        | DataType::UInt8
                        | DataType::UInt16
                        | DataType::UInt32
                        | DataType::UInt64
                )
            })
            .map(|col| col.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_load_preserves_columns_and_order() {
        let file = create_temp_csv(
            "Order ID,Product Name,Sales\nA-1,\"Chair, Oak\",10.5\nA-2,Desk,20\nA-3,Lamp,3.25\n",
        );
        let df = DataLoader::load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["Order ID", "Product Name", "Sales"]);

        let products = df.column("Product Name").unwrap().str().unwrap();
        assert_eq!(products.get(0), Some("Chair, Oak"));
        assert_eq!(products.get(2), Some("Lamp"));
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let err = DataLoader::load_csv(Path::new("/nonexistent/dir/train.csv")).unwrap_err();
        assert!(matches!(err, AnalysisError::FileAccess { .. }));
        assert!(err.to_string().contains("/nonexistent/dir/train.csv"));
    }

    #[test]
    fn test_ragged_rows_are_parse_errors() {
        let too_few = "a,b,c\n1,2,3\n4,5\n".as_bytes().to_vec();
        assert!(matches!(
            DataLoader::parse_csv_bytes(too_few),
            Err(AnalysisError::Parse(_))
        ));

        let too_many = "a,b\n1,2\n3,4,5\n".as_bytes().to_vec();
        assert!(matches!(
            DataLoader::parse_csv_bytes(too_many),
            Err(AnalysisError::Parse(_))
        ));
    }

    #[test]
    fn test_na_tokens_load_as_nulls() {
        let df = DataLoader::parse_csv_bytes(
            b"Region,Sales\nNA,100\nWest,NaN\nN/A,null\nEast,2.5\n".to_vec(),
        )
        .unwrap();

        let regions = df.column("Region").unwrap().str().unwrap();
        assert_eq!(regions.null_count(), 2);
        assert_eq!(regions.get(1), Some("West"));

        let sales = df.column("Sales").unwrap();
        assert!(matches!(sales.dtype(), DataType::Float64 | DataType::Int64));
        assert_eq!(sales.null_count(), 2);
        let sales = sales.cast(&DataType::Float64).unwrap();
        assert_eq!(sales.f64().unwrap().sum(), Some(102.5));
    }

    #[test]
    fn test_numeric_columns() {
        let df = DataLoader::parse_csv_bytes(b"Row ID,Region,Sales\n1,West,2.5\n2,East,4.0\n".to_vec())
            .unwrap();
        assert_eq!(DataLoader::get_numeric_columns(&df), vec!["Row ID", "Sales"]);
    }
}
