//! Tooltip content resolved from the shared hover time.

use crate::chart::draw::{DrawCommandList, Rgba, TextAlign};
use crate::chart::style::ChartStyle;
use crate::chart::viewport::Rect;
use crate::formatting::format_clock;
use crate::model::{TimeSeriesModel, Timestamp};
use crate::sync_bus::HoverState;

/// Value shown in one tooltip row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// Nearest sample within snapping distance.
    Sample {
        timestamp: Timestamp,
        value: f64,
        display: String,
    },
    /// Nothing close enough, or the nearest sample is a missing marker.
    NoData,
}

/// One series row of a tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub series: String,
    pub value: RowValue,
}

impl TooltipRow {
    /// Displayed value text.
    pub fn display(&self) -> &str {
        match &self.value {
            RowValue::Sample { display, .. } => display,
            RowValue::NoData => "no data",
        }
    }
}

/// Tooltip for one hover time: a title and one row per series.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub timestamp: Timestamp,
    pub title: String,
    pub rows: Vec<TooltipRow>,
}

impl TooltipContent {
    pub fn row(&self, series: &str) -> Option<&TooltipRow> {
        self.rows.iter().find(|r| r.series == series)
    }

    /// Draw as a box next to `anchor_x`, flipped left when it would overflow the plot.
    pub fn draw(&self, list: &mut DrawCommandList, anchor_x: f32, plot: Rect, style: &ChartStyle) {
        const LINE: f32 = 14.0;
        const CHAR: f32 = 6.0;
        const MARGIN: f32 = 8.0;

        let longest = self
            .rows
            .iter()
            .map(|r| r.series.len() + r.display().len() + 2)
            .chain(std::iter::once(self.title.len()))
            .max()
            .unwrap_or(0);
        let width = longest as f32 * CHAR + MARGIN * 2.0;
        let height = (self.rows.len() + 1) as f32 * LINE + MARGIN;

        let mut x = anchor_x + MARGIN;
        if x + width > plot.right() {
            x = (anchor_x - MARGIN - width).max(plot.x);
        }
        let y = plot.y + MARGIN;

        list.fill_rect(x, y, width, height, Rgba::rgb(0x10, 0x10, 0x14).with_alpha(0xe0));
        list.text(
            x + MARGIN,
            y + MARGIN / 2.0,
            self.title.clone(),
            style.crosshair_color,
            11.0,
            TextAlign::Left,
        );
        for (i, row) in self.rows.iter().enumerate() {
            let row_y = y + MARGIN / 2.0 + (i + 1) as f32 * LINE;
            list.text(
                x + MARGIN,
                row_y,
                format!("{}: {}", row.series, row.display()),
                style.text_color,
                11.0,
                TextAlign::Left,
            );
        }
    }
}

/// Resolves tooltip rows with an injected value formatter.
pub struct TooltipPresenter {
    snap_distance_px: f32,
    ms_per_pixel: f64,
    formatter: Box<dyn Fn(f64) -> String>,
}

impl std::fmt::Debug for TooltipPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TooltipPresenter")
            .field("snap_distance_px", &self.snap_distance_px)
            .field("ms_per_pixel", &self.ms_per_pixel)
            .finish_non_exhaustive()
    }
}

impl TooltipPresenter {
    pub fn new(snap_distance_px: f32, formatter: Box<dyn Fn(f64) -> String>) -> Self {
        Self {
            snap_distance_px,
            ms_per_pixel: 1.0,
            formatter,
        }
    }

    /// Update the horizontal scale used to convert the snapping distance.
    pub fn set_ms_per_pixel(&mut self, ms_per_pixel: f64) {
        self.ms_per_pixel = ms_per_pixel.max(0.0);
    }

    /// Snapping distance in milliseconds at the current scale.
    pub fn snap_distance_ms(&self) -> i64 {
        (self.snap_distance_px as f64 * self.ms_per_pixel).round() as i64
    }

    /// Tooltip for `hover`, or `None` when nothing is hovered.
    ///
    /// Every series gets a row so the row count stays stable while the
    /// cursor moves.
    pub fn present(&self, hover: &HoverState, model: &TimeSeriesModel) -> Option<TooltipContent> {
        let t = hover.timestamp?;
        let snap = self.snap_distance_ms();

        let rows = model
            .series()
            .iter()
            .map(|series| {
                let value = match series.sample_nearest(t) {
                    Some(sample) if (sample.timestamp - t).abs() <= snap => match sample.value {
                        Some(v) => RowValue::Sample {
                            timestamp: sample.timestamp,
                            value: v,
                            display: (self.formatter)(v),
                        },
                        None => RowValue::NoData,
                    },
                    _ => RowValue::NoData,
                };
                TooltipRow {
                    series: series.id().to_string(),
                    value,
                }
            })
            .collect();

        Some(TooltipContent {
            timestamp: t,
            title: format_clock(t, true),
            rows,
        })
    }
}
