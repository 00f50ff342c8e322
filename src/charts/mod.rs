//! Charts module - Static chart rendering

mod labels;
mod renderer;

pub use labels::{rotated_extent, stamp_rotated_label};
pub use renderer::{ChartKind, StaticChartRenderer};
