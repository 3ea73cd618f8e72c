//! Render style derived from [`ChartConfig`].

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use lindash_common::{ChartConfig, ValueFormat};

use super::draw::Rgba;
use super::viewport::Rect;
use crate::formatting::format_with;
use crate::model::Series;

/// Space between the widget border and the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            left: 56.0,
            right: 16.0,
            top: 16.0,
            bottom: 28.0,
        }
    }
}

/// Everything besides model and viewport that affects rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub width: f32,
    pub height: f32,
    pub padding: Padding,
    /// Pixels per aggregate column when downsampling.
    pub downsample_threshold: f32,
    pub value_range_margin: f64,
    pub value_format: ValueFormat,
    pub decimals: u8,
    pub grid_rows: u8,
    pub grid_columns: u8,
    pub line_width: f32,
    pub background: Rgba,
    pub plot_background: Rgba,
    pub grid_color: Rgba,
    pub text_color: Rgba,
    pub crosshair_color: Rgba,
    pub selection_color: Rgba,
    pub colors: BTreeMap<String, Rgba>,
    pub palette: Vec<Rgba>,
    /// Series toggled off in the legend.
    pub hidden: BTreeSet<String>,
}

const FALLBACK_COLOR: Rgba = Rgba::rgb(0x4e, 0x79, 0xa7);

impl ChartStyle {
    /// Build a style of the given size from configuration.
    ///
    /// Colors that fail to parse are logged and skipped.
    pub fn from_config(config: &ChartConfig, width: f32, height: f32) -> Self {
        let mut colors = BTreeMap::new();
        for (series, hex) in &config.colors {
            match Rgba::parse_hex(hex) {
                Some(color) => {
                    colors.insert(series.clone(), color);
                }
                None => tracing::warn!(series = %series, color = %hex, "Ignoring invalid color"),
            }
        }

        let palette: Vec<Rgba> = config
            .palette
            .iter()
            .filter_map(|hex| {
                let parsed = Rgba::parse_hex(hex);
                if parsed.is_none() {
                    tracing::warn!(color = %hex, "Ignoring invalid palette color");
                }
                parsed
            })
            .collect();

        Self {
            width,
            height,
            padding: Padding::default(),
            downsample_threshold: config.downsample_threshold.max(1.0),
            value_range_margin: config.value_range_margin.max(0.0),
            value_format: config.value_format,
            decimals: config.decimals,
            grid_rows: 5,
            grid_columns: 4,
            line_width: 1.5,
            background: Rgba::rgb(0x1a, 0x1a, 0x1f),
            plot_background: Rgba::rgb(0x14, 0x14, 0x1a),
            grid_color: Rgba::rgb(0x33, 0x33, 0x40),
            text_color: Rgba::rgb(0x80, 0x80, 0x80),
            crosshair_color: Rgba::rgb(0xb0, 0xb0, 0xb0),
            selection_color: Rgba::rgb(0x4e, 0x79, 0xa7).with_alpha(0x40),
            colors,
            palette: if palette.is_empty() {
                vec![FALLBACK_COLOR]
            } else {
                palette
            },
            hidden: BTreeSet::new(),
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Plot rectangle inside the padding; zero-sized when the widget is too small.
    pub fn plot_area(&self) -> Rect {
        let width = (self.width - self.padding.left - self.padding.right).max(0.0);
        let height = (self.height - self.padding.top - self.padding.bottom).max(0.0);
        Rect::new(self.padding.left, self.padding.top, width, height)
    }

    /// Color of a series: explicit config, then the series' own, then palette by position.
    pub fn color_for(&self, series: &Series, index: usize) -> Rgba {
        self.colors
            .get(series.id())
            .copied()
            .or_else(|| series.color().and_then(Rgba::parse_hex))
            .unwrap_or_else(|| self.palette[index % self.palette.len()])
    }

    pub fn is_hidden(&self, series_id: &str) -> bool {
        self.hidden.contains(series_id)
    }

    /// Show a hidden series or hide a shown one; returns whether it is now hidden.
    pub fn toggle_hidden(&mut self, series_id: &str) -> bool {
        if self.hidden.remove(series_id) {
            false
        } else {
            self.hidden.insert(series_id.to_string());
            true
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        format_with(self.value_format, self.decimals, value)
    }
}

impl Hash for ChartStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.to_bits().hash(state);
        self.height.to_bits().hash(state);
        self.padding.left.to_bits().hash(state);
        self.padding.right.to_bits().hash(state);
        self.padding.top.to_bits().hash(state);
        self.padding.bottom.to_bits().hash(state);
        self.downsample_threshold.to_bits().hash(state);
        self.value_range_margin.to_bits().hash(state);
        self.value_format.hash(state);
        self.decimals.hash(state);
        self.grid_rows.hash(state);
        self.grid_columns.hash(state);
        self.line_width.to_bits().hash(state);
        self.background.hash(state);
        self.plot_background.hash(state);
        self.grid_color.hash(state);
        self.text_color.hash(state);
        self.crosshair_color.hash(state);
        self.selection_color.hash(state);
        self.colors.hash(state);
        self.palette.hash(state);
        self.hidden.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawSeries, TimeRange, TimeSeriesModel};

    #[test]
    fn test_plot_area() {
        let style = ChartStyle::from_config(&ChartConfig::default(), 200.0, 100.0);
        assert_eq!(style.plot_area(), Rect::new(56.0, 16.0, 128.0, 56.0));

        let tiny = style.with_size(10.0, 10.0);
        assert_eq!(tiny.plot_area().width, 0.0);
    }

    #[test]
    fn test_color_resolution_order() {
        let mut config = ChartConfig::default();
        config.colors.insert("a".to_string(), "#ff0000".to_string());
        config.colors.insert("b".to_string(), "not-a-color".to_string());
        let style = ChartStyle::from_config(&config, 100.0, 100.0);

        let model = TimeSeriesModel::build(
            vec![
                RawSeries::from_values("a", &[]).with_color("#00ff00"),
                RawSeries::from_values("b", &[]).with_color("#0000ff"),
                RawSeries::from_values("c", &[]),
            ],
            TimeRange::new(0, 1),
        )
        .unwrap();

        let series = model.series();
        assert_eq!(style.color_for(&series[0], 0), Rgba::rgb(255, 0, 0));
        assert_eq!(style.color_for(&series[1], 1), Rgba::rgb(0, 0, 255));
        assert_eq!(style.color_for(&series[2], 2), style.palette[2]);
    }

    #[test]
    fn test_toggle_hidden() {
        let mut style = ChartStyle::from_config(&ChartConfig::default(), 100.0, 100.0);
        assert!(style.toggle_hidden("cpu"));
        assert!(style.is_hidden("cpu"));
        assert!(!style.toggle_hidden("cpu"));
        assert!(!style.is_hidden("cpu"));
    }
}
