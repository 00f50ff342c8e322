//! Column names of the Superstore sales export.

pub const ORDER_ID: &str = "Order ID";
pub const ORDER_DATE: &str = "Order Date";
pub const SHIP_DATE: &str = "Ship Date";
pub const CUSTOMER_ID: &str = "Customer ID";
pub const SEGMENT: &str = "Segment";
pub const REGION: &str = "Region";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const PRODUCT_NAME: &str = "Product Name";
pub const SALES: &str = "Sales";

// Derived from Order Date during cleaning
pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const QUARTER: &str = "Quarter";

/// Columns the pipeline reads; any other input column is carried through.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    ORDER_ID,
    ORDER_DATE,
    SHIP_DATE,
    CUSTOMER_ID,
    SEGMENT,
    REGION,
    CATEGORY,
    SUB_CATEGORY,
    PRODUCT_NAME,
    SALES,
];

/// Text columns normalised to String regardless of inferred dtype.
pub const TEXT_COLUMNS: [&str; 7] = [
    ORDER_ID,
    CUSTOMER_ID,
    SEGMENT,
    REGION,
    CATEGORY,
    SUB_CATEGORY,
    PRODUCT_NAME,
];

/// Input date format, e.g. `15/03/2024`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Label used for rows whose grouping value is null.
pub const MISSING_LABEL: &str = "(missing)";
