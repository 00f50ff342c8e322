//! Data module - CSV loading and cleaning

mod loader;
mod processor;
pub mod schema;

pub use loader::DataLoader;
pub use processor::{quarter_of, CleaningSummary, DataProcessor};
