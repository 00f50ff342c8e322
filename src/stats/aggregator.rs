//! Sales Aggregator Module
//! Grouped Sales reductions over the cleaned table and the key-insight totals.
//!
//! Groups appear in first-encountered order and descending sorts are stable,
//! so equal sums keep that order. Null keys form a group labelled `(missing)`.

use crate::data::schema::*;
use crate::data::DataProcessor;
use crate::error::Result;
use chrono::NaiveDate;
use log::debug;
use polars::prelude::*;

/// Length of the product and sub-category rankings.
pub const TOP_N: usize = 10;

/// Sales total of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub label: String,
    pub sales: f64,
}

/// Sales total of one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub sales: f64,
}

impl MonthTotal {
    /// `YYYY-MM` label.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// The eight reductions reported and charted.
#[derive(Debug, Clone)]
pub struct SalesAggregates {
    pub by_category: Vec<GroupTotal>,
    pub by_region: Vec<GroupTotal>,
    pub by_segment: Vec<GroupTotal>,
    pub top_products: Vec<GroupTotal>,
    pub by_year: Vec<GroupTotal>,
    pub average_order_value: f64,
    pub top_sub_categories: Vec<GroupTotal>,
    pub monthly: Vec<MonthTotal>,
}

/// Headline figures for the closing summary.
#[derive(Debug, Clone)]
pub struct KeyInsights {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub total_customers: usize,
    pub average_order_value: f64,
    pub top_category: Option<GroupTotal>,
    pub top_region: Option<GroupTotal>,
    pub top_segment: Option<GroupTotal>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// Largest Sales first. Stable, and total even when a sum is NaN.
pub fn sort_descending(totals: &mut [GroupTotal]) {
    totals.sort_by(|a, b| b.sales.total_cmp(&a.sales));
}

pub struct SalesAggregator;

impl SalesAggregator {
    /// Compute every aggregate over the cleaned table.
    pub fn compute(df: &DataFrame) -> Result<SalesAggregates> {
        let aggregates = SalesAggregates {
            by_category: Self::sales_descending(df, CATEGORY)?,
            by_region: Self::sales_descending(df, REGION)?,
            by_segment: Self::sales_descending(df, SEGMENT)?,
            top_products: Self::top_n(df, PRODUCT_NAME, TOP_N)?,
            by_year: Self::sales_by_year(df)?,
            average_order_value: Self::average_order_value(df)?,
            top_sub_categories: Self::top_n(df, SUB_CATEGORY, TOP_N)?,
            monthly: Self::monthly_sales(df)?,
        };
        debug!(
            "Aggregated {} categories, {} regions, {} months",
            aggregates.by_category.len(),
            aggregates.by_region.len(),
            aggregates.monthly.len()
        );
        Ok(aggregates)
    }

    /// Sum of Sales per distinct value of `key`, in first-encountered order.
    pub fn sales_by(df: &DataFrame, key: &str) -> Result<Vec<GroupTotal>> {
        let grouped = df
            .clone()
            .lazy()
            .group_by_stable([col(key)])
            .agg([col(SALES).sum()])
            .collect()?;

        let labels = grouped.column(key)?.cast(&DataType::String)?;
        let sums = grouped.column(SALES)?.cast(&DataType::Float64)?;

        Ok(labels
            .str()?
            .into_iter()
            .zip(sums.f64()?.into_iter())
            .map(|(label, sales)| GroupTotal {
                label: label.unwrap_or(MISSING_LABEL).to_string(),
                sales: sales.unwrap_or(0.0),
            })
            .collect())
    }

    /// Sum of Sales per group, largest first.
    pub fn sales_descending(df: &DataFrame, key: &str) -> Result<Vec<GroupTotal>> {
        let mut totals = Self::sales_by(df, key)?;
        sort_descending(&mut totals);
        Ok(totals)
    }

    /// The `n` groups with the largest Sales sums.
    pub fn top_n(df: &DataFrame, key: &str, n: usize) -> Result<Vec<GroupTotal>> {
        let mut totals = Self::sales_descending(df, key)?;
        totals.truncate(n);
        Ok(totals)
    }

    /// Sum of Sales per order year, ascending; a missing year sorts last.
    pub fn sales_by_year(df: &DataFrame) -> Result<Vec<GroupTotal>> {
        let grouped = df
            .clone()
            .lazy()
            .group_by_stable([col(YEAR)])
            .agg([col(SALES).sum()])
            .collect()?;

        let years = grouped.column(YEAR)?.cast(&DataType::Int32)?;
        let sums = grouped.column(SALES)?.cast(&DataType::Float64)?;

        let mut rows: Vec<(Option<i32>, f64)> = years
            .i32()?
            .into_iter()
            .zip(sums.f64()?.into_iter())
            .map(|(year, sales)| (year, sales.unwrap_or(0.0)))
            .collect();
        rows.sort_by_key(|(year, _)| (year.is_none(), *year));

        Ok(rows
            .into_iter()
            .map(|(year, sales)| GroupTotal {
                label: year.map_or_else(|| MISSING_LABEL.to_string(), |y| y.to_string()),
                sales,
            })
            .collect())
    }

    /// Mean over orders of the per-order Sales sum.
    pub fn average_order_value(df: &DataFrame) -> Result<f64> {
        let per_order = df
            .clone()
            .lazy()
            .group_by([col(ORDER_ID)])
            .agg([col(SALES).sum()])
            .collect()?;

        let sums = per_order.column(SALES)?.cast(&DataType::Float64)?;
        Ok(sums.f64()?.mean().unwrap_or(f64::NAN))
    }

    /// Sum of Sales per calendar month, chronological. Rows without an
    /// Order Date have no month and are left out.
    pub fn monthly_sales(df: &DataFrame) -> Result<Vec<MonthTotal>> {
        let grouped = df
            .clone()
            .lazy()
            .filter(col(YEAR).is_not_null())
            .group_by_stable([col(YEAR), col(MONTH)])
            .agg([col(SALES).sum()])
            .collect()?;

        let years = grouped.column(YEAR)?.cast(&DataType::Int32)?;
        let months = grouped.column(MONTH)?.cast(&DataType::Int32)?;
        let sums = grouped.column(SALES)?.cast(&DataType::Float64)?;

        let mut monthly: Vec<MonthTotal> = years
            .i32()?
            .into_iter()
            .zip(months.i32()?.into_iter())
            .zip(sums.f64()?.into_iter())
            .filter_map(|((year, month), sales)| {
                Some(MonthTotal {
                    year: year?,
                    month: month? as u32,
                    sales: sales.unwrap_or(0.0),
                })
            })
            .collect();
        monthly.sort_by_key(|m| (m.year, m.month));
        Ok(monthly)
    }

    /// Totals, distinct counts, leaders and date range.
    pub fn key_insights(df: &DataFrame, aggregates: &SalesAggregates) -> Result<KeyInsights> {
        let sales = df.column(SALES)?.cast(&DataType::Float64)?;
        let total_revenue = sales.f64()?.sum().unwrap_or(0.0);

        let order_dates: Vec<NaiveDate> = DataProcessor::read_date_column(df, ORDER_DATE)?
            .into_iter()
            .flatten()
            .collect();
        let date_range = order_dates
            .iter()
            .min()
            .zip(order_dates.iter().max())
            .map(|(first, last)| (*first, *last));

        Ok(KeyInsights {
            total_revenue,
            total_orders: Self::distinct_count(df, ORDER_ID)?,
            total_customers: Self::distinct_count(df, CUSTOMER_ID)?,
            average_order_value: aggregates.average_order_value,
            top_category: aggregates.by_category.first().cloned(),
            top_region: aggregates.by_region.first().cloned(),
            top_segment: aggregates.by_segment.first().cloned(),
            date_range,
        })
    }

    /// Number of distinct non-null values in a column.
    fn distinct_count(df: &DataFrame, name: &str) -> Result<usize> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .drop_nulls()
            .n_unique()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataLoader, DataProcessor};

    const HEADER: &str = "Order ID,Order Date,Ship Date,Customer ID,Segment,Region,Category,Sub-Category,Product Name,Sales\n";

    fn cleaned(rows: &[&str]) -> DataFrame {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        let df = DataLoader::parse_csv_bytes(text.into_bytes()).unwrap();
        DataProcessor::clean(df).unwrap().0
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_average_order_value_is_mean_of_order_sums() {
        let df = cleaned(&[
            "A,01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Chairs,Chair,10",
            "A,01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Tables,Table,20",
            "B,05/01/2024,07/01/2024,C2,Consumer,East,Technology,Phones,Phone,50",
        ]);
        assert!(approx(SalesAggregator::average_order_value(&df).unwrap(), 40.0));
    }

    #[test]
    fn test_multi_line_order_counts_once() {
        let df = cleaned(&[
            "A,01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Chairs,Chair,10",
            "A,01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Tables,Table,20",
            "A,01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Bookcases,Shelf,30",
        ]);
        let average = SalesAggregator::average_order_value(&df).unwrap();
        assert!(approx(average, 60.0));

        let naive_row_mean = 20.0;
        assert!(!approx(average, naive_row_mean));
    }

    #[test]
    fn test_descending_sort_keeps_first_seen_order_on_ties() {
        let df = cleaned(&[
            "A,01/01/2024,02/01/2024,C1,Consumer,South,Furniture,Chairs,Chair,10",
            "B,01/01/2024,02/01/2024,C1,Consumer,North,Furniture,Chairs,Chair,30",
            "C,01/01/2024,02/01/2024,C1,Consumer,East,Furniture,Chairs,Chair,10",
            "D,01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Chairs,Chair,10",
        ]);
        let labels: Vec<String> = SalesAggregator::sales_descending(&df, REGION)
            .unwrap()
            .into_iter()
            .map(|g| g.label)
            .collect();
        assert_eq!(labels, vec!["North", "South", "East", "West"]);
    }

    #[test]
    fn test_sort_with_nan_sum_is_total_and_stable() {
        let group = |label: &str, sales: f64| GroupTotal {
            label: label.to_string(),
            sales,
        };
        let mut totals: Vec<GroupTotal> = (0..40)
            .map(|i| group(&format!("G{i}"), (i % 3) as f64))
            .collect();
        totals.insert(17, group("bad", f64::NAN));

        sort_descending(&mut totals);

        assert_eq!(totals[0].label, "bad");
        let rest = &totals[1..];
        assert!(rest.windows(2).all(|w| w[0].sales >= w[1].sales));
        let twos: Vec<&str> = rest
            .iter()
            .filter(|g| g.sales == 2.0)
            .map(|g| g.label.as_str())
            .collect();
        assert_eq!(&twos[..3], ["G2", "G5", "G8"]);
    }

    #[test]
    fn test_top_n_truncation() {
        let rows: Vec<String> = (0..12)
            .map(|i| {
                format!(
                    "O{i},01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Sub{i},Product {i},{}",
                    100 + i
                )
            })
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let df = cleaned(&refs);

        let top = SalesAggregator::top_n(&df, PRODUCT_NAME, 10).unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].label, "Product 11");
        assert!(top.windows(2).all(|w| w[0].sales >= w[1].sales));

        let few = SalesAggregator::top_n(&df, CATEGORY, 10).unwrap();
        assert_eq!(few.len(), 1);
    }

    #[test]
    fn test_groupings_partition_total_sales() {
        let df = cleaned(&[
            "A,01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Chairs,Chair,10.5",
            "B,03/02/2024,05/02/2024,C2,Corporate,East,Technology,Phones,Phone,20.25",
            "C,03/02/2025,05/02/2025,C3,Home Office,East,Office Supplies,Paper,Paper,5",
            "D,07/06/2025,09/06/2025,C1,Consumer,,Technology,Phones,Phone,1.25",
        ]);
        let aggregates = SalesAggregator::compute(&df).unwrap();
        let insights = SalesAggregator::key_insights(&df, &aggregates).unwrap();

        let sum = |groups: &[GroupTotal]| groups.iter().map(|g| g.sales).sum::<f64>();
        assert!(approx(insights.total_revenue, 37.0));
        assert!(approx(sum(&aggregates.by_category), insights.total_revenue));
        assert!(approx(sum(&aggregates.by_region), insights.total_revenue));
        assert!(approx(sum(&aggregates.by_year), insights.total_revenue));
        assert!(aggregates.by_region.iter().any(|g| g.label == MISSING_LABEL));
    }

    #[test]
    fn test_year_and_month_ordering() {
        let df = cleaned(&[
            "A,15/03/2025,16/03/2025,C1,Consumer,West,Furniture,Chairs,Chair,5",
            "B,02/11/2024,03/11/2024,C1,Consumer,West,Furniture,Chairs,Chair,7",
            "C,20/03/2025,21/03/2025,C1,Consumer,West,Furniture,Chairs,Chair,1",
            "D,01/01/2024,02/01/2024,C1,Consumer,West,Furniture,Chairs,Chair,2",
        ]);
        let years: Vec<(String, f64)> = SalesAggregator::sales_by_year(&df)
            .unwrap()
            .into_iter()
            .map(|g| (g.label, g.sales))
            .collect();
        assert_eq!(years, vec![("2024".to_string(), 9.0), ("2025".to_string(), 6.0)]);

        let months: Vec<(String, f64)> = SalesAggregator::monthly_sales(&df)
            .unwrap()
            .iter()
            .map(|m| (m.label(), m.sales))
            .collect();
        assert_eq!(
            months,
            vec![
                ("2024-01".to_string(), 2.0),
                ("2024-11".to_string(), 7.0),
                ("2025-03".to_string(), 6.0),
            ]
        );
    }

    #[test]
    fn test_key_insights_counts_and_range() {
        let df = cleaned(&[
            "A,15/03/2024,16/03/2024,C1,Consumer,West,Furniture,Chairs,Chair,100",
            "A,15/03/2024,16/03/2024,C1,Consumer,West,Technology,Phones,Phone,300",
            "B,02/01/2024,03/01/2024,C2,Corporate,East,Furniture,Chairs,Chair,50",
            "C,30/12/2025,02/01/2026,C1,Consumer,East,Furniture,Chairs,Chair,25",
        ]);
        let aggregates = SalesAggregator::compute(&df).unwrap();
        let insights = SalesAggregator::key_insights(&df, &aggregates).unwrap();

        assert_eq!(insights.total_orders, 3);
        assert_eq!(insights.total_customers, 2);
        assert_eq!(insights.top_category.unwrap().label, "Technology");
        assert_eq!(insights.top_segment.unwrap().label, "Consumer");
        assert_eq!(
            insights.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 30).unwrap()
            ))
        );
    }
}
