//! Stats module - Dataset overview and sales aggregation

mod aggregator;
mod calculator;

pub use aggregator::{
    sort_descending, GroupTotal, KeyInsights, MonthTotal, SalesAggregates, SalesAggregator, TOP_N,
};
pub use calculator::{ColumnInfo, ColumnSummary, StatsCalculator};
