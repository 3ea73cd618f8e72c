use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// How numeric values are rendered on axes and in tooltips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    /// Scale suffixes (K, M, G) for large values.
    #[default]
    Compact,
    /// Fixed number of decimals.
    Fixed,
    /// Value is a ratio in [0, 1], shown as a percentage.
    Percent,
    /// Value is a byte count (KiB, MiB, GiB).
    Bytes,
}

/// Chart engine tuning and styling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    /// Pixels per aggregate column once a series is downsampled.
    #[serde(default = "default_downsample_threshold")]
    pub downsample_threshold: f32,

    /// Fraction of the value span added above and below an auto range.
    #[serde(default = "default_value_range_margin")]
    pub value_range_margin: f64,

    /// Maximum horizontal distance (pixels) between cursor and sample for a
    /// tooltip row to show the sample.
    #[serde(default = "default_snap_distance")]
    pub snap_distance: f32,

    /// Minimum size (pixels) of a zoom rectangle; smaller drags are clicks.
    #[serde(default = "default_zoom_min_pixels")]
    pub zoom_min_pixels: f32,

    /// Explicit series colors (series id -> `#rrggbb`).
    #[serde(default)]
    pub colors: BTreeMap<String, String>,

    /// Palette used for series without an explicit color.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// Value formatting policy.
    #[serde(default)]
    pub value_format: ValueFormat,

    /// Decimals used by the `fixed` and `percent` formats.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_downsample_threshold() -> f32 {
    2.0
}

fn default_value_range_margin() -> f64 {
    0.1
}

fn default_snap_distance() -> f32 {
    12.0
}

fn default_zoom_min_pixels() -> f32 {
    5.0
}

fn default_decimals() -> u8 {
    2
}

fn default_palette() -> Vec<String> {
    [
        "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            downsample_threshold: default_downsample_threshold(),
            value_range_margin: default_value_range_margin(),
            snap_distance: default_snap_distance(),
            zoom_min_pixels: default_zoom_min_pixels(),
            colors: BTreeMap::new(),
            palette: default_palette(),
            value_format: ValueFormat::default(),
            decimals: default_decimals(),
        }
    }
}

impl ChartConfig {
    /// Reject option values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.downsample_threshold.is_finite() && self.downsample_threshold >= 1.0) {
            return Err(Error::Config(format!(
                "downsampleThreshold must be >= 1 pixel, got {}",
                self.downsample_threshold
            )));
        }
        if !(self.value_range_margin.is_finite() && self.value_range_margin >= 0.0) {
            return Err(Error::Config(format!(
                "valueRangeMargin must be a non-negative fraction, got {}",
                self.value_range_margin
            )));
        }
        if !(self.snap_distance.is_finite() && self.snap_distance >= 0.0) {
            return Err(Error::Config(format!(
                "snapDistance must be non-negative, got {}",
                self.snap_distance
            )));
        }
        if !(self.zoom_min_pixels.is_finite() && self.zoom_min_pixels >= 1.0) {
            return Err(Error::Config(format!(
                "zoomMinPixels must be >= 1 pixel, got {}",
                self.zoom_min_pixels
            )));
        }
        if self.palette.is_empty() {
            return Err(Error::Config("palette must not be empty".to_string()));
        }
        Ok(())
    }
}

/// A sync group declared up front in the dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// Group identifier.
    pub id: String,

    /// Whether zoom/pan on one chart applies to all charts of the group.
    #[serde(default)]
    pub linked_zoom: bool,
}

/// Demo dashboard options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoConfig {
    /// Number of charts to mount.
    #[serde(default = "default_chart_count")]
    pub charts: usize,

    /// Samples per series.
    #[serde(default = "default_points")]
    pub points: usize,

    /// Sampling interval of generated data (ms).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: i64,

    /// Refresh period of generated data (seconds).
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_chart_count() -> usize {
    4
}

fn default_points() -> usize {
    3_600
}

fn default_interval_ms() -> i64 {
    1_000
}

fn default_refresh_secs() -> u64 {
    5
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            charts: default_chart_count(),
            points: default_points(),
            interval_ms: default_interval_ms(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

/// Top-level dashboard configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Chart engine options.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Sync groups.
    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Demo data generation.
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Default location of the dashboard config file.
///
/// `$XDG_CONFIG_HOME/lindash/config.json5` on Linux, the platform
/// equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lindash").join("config.json5"))
}

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    json5::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashboard_config() {
        let json5 = r##"
        {
            chart: {
                downsampleThreshold: 3,
                snapDistance: 20,
                colors: { "cpu": "#ff0000" },
                valueFormat: "percent",
            },
            groups: [
                { id: "overview", linkedZoom: true },
                { id: "storage" },
            ],
            logging: {
                level: "debug",
            },
        }
        "##;

        let config: DashboardConfig = parse_config(json5).unwrap();

        assert_eq!(config.chart.downsample_threshold, 3.0);
        assert_eq!(config.chart.snap_distance, 20.0);
        assert_eq!(config.chart.zoom_min_pixels, 5.0);
        assert_eq!(config.chart.colors.get("cpu").map(String::as_str), Some("#ff0000"));
        assert_eq!(config.chart.value_format, ValueFormat::Percent);
        assert!(config.groups[0].linked_zoom);
        assert!(!config.groups[1].linked_zoom);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_default_config() {
        let config: DashboardConfig = parse_config("{}").unwrap();

        assert_eq!(config.chart, ChartConfig::default());
        assert_eq!(config.chart.value_range_margin, 0.1);
        assert_eq!(config.chart.palette.len(), 8);
        assert!(config.groups.is_empty());
        assert_eq!(config.demo.charts, 4);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.chart.validate().is_ok());
    }

    #[test]
    fn test_json_logging_format() {
        let json5 = r#"{ logging: { level: "warn", format: "json" } }"#;
        let config: DashboardConfig = parse_config(json5).unwrap();

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ChartConfig {
            downsample_threshold: 0.5,
            ..ChartConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ChartConfig {
            palette: Vec::new(),
            ..ChartConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ChartConfig {
            value_range_margin: -0.1,
            ..ChartConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config::<DashboardConfig>("/nonexistent/lindash.json5").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
