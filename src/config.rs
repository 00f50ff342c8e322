//! Configuration Module
//! Run settings and chart styling, loaded from an optional JSON file.

use crate::error::{AnalysisError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "SALES_ANALYSIS_CONFIG";

/// Output resolution of every chart.
pub const CHART_DPI: u32 = 300;

pub type Rgb = [u8; 3];

/// Settings for one analysis run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    pub style: ChartStyle,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("train.csv"),
            output_dir: PathBuf::from("."),
            preview_rows: 5,
            style: ChartStyle::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| AnalysisError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Config(format!("{}: {e}", path.display())))
    }

    /// Defaults, or the file named by `SALES_ANALYSIS_CONFIG` when set.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_json_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

/// Plot styling handed to the renderer.
///
/// Sizes are in points and scaled by [`CHART_DPI`], so a 10x6 inch figure is
/// a 3000x1800 pixel image.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub font_family: String,
    pub title_pt: f64,
    pub axis_label_pt: f64,
    pub tick_label_pt: f64,
    pub line_width_pt: f64,
    pub marker_size_pt: f64,
    pub grid_alpha: f64,
    pub category_colors: Vec<Rgb>,
    pub region_colors: Vec<Rgb>,
    pub segment_colors: Vec<Rgb>,
    pub trend_color: Rgb,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            title_pt: 16.0,
            axis_label_pt: 12.0,
            tick_label_pt: 10.0,
            line_width_pt: 2.0,
            marker_size_pt: 4.0,
            grid_alpha: 0.3,
            category_colors: vec![[0x1f, 0x77, 0xb4], [0xff, 0x7f, 0x0e], [0x2c, 0xa0, 0x2c]],
            region_colors: vec![
                [0xd6, 0x27, 0x28],
                [0x94, 0x67, 0xbd],
                [0x8c, 0x56, 0x4b],
                [0xe3, 0x77, 0xc2],
            ],
            segment_colors: vec![[0xff, 0x99, 0x99], [0x66, 0xb3, 0xff], [0x99, 0xff, 0x99]],
            trend_color: [0x1f, 0x77, 0xb4],
        }
    }
}

impl ChartStyle {
    /// Convert a size in points to pixels at the chart resolution.
    pub fn px(&self, points: f64) -> u32 {
        (points * CHART_DPI as f64 / 72.0).round().max(1.0) as u32
    }

    /// Pixel dimensions of a figure given in inches.
    pub fn figure_px(&self, width_in: f64, height_in: f64) -> (u32, u32) {
        (
            (width_in * CHART_DPI as f64).round() as u32,
            (height_in * CHART_DPI as f64).round() as u32,
        )
    }
}
