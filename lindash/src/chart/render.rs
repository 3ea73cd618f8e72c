//! Pure conversion of (model, viewport, style) into draw commands.

use super::downsample::{self, Bucket};
use super::draw::{DrawCommand, DrawCommandList, Layer, Rgba, TextAlign};
use super::style::ChartStyle;
use super::viewport::{Rect, Scale, ValueRange, Viewport};
use crate::formatting::format_clock;
use crate::model::{Sample, Series, TimeSeriesModel, Timestamp};
use crate::tooltip::TooltipContent;

const HOUR_MS: i64 = 3_600_000;

/// Transient state drawn on top of the memoized base frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay<'a> {
    pub hover: Option<Timestamp>,
    pub selection: Option<Rect>,
    pub tooltip: Option<&'a TooltipContent>,
    pub status_message: Option<&'a str>,
}

/// Stateless chart renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRenderer;

impl ChartRenderer {
    /// Render the base frame: chrome, gridlines, axes and series.
    ///
    /// Never fails; an empty model yields chrome only.
    pub fn render(
        &self,
        model: &TimeSeriesModel,
        viewport: &Viewport,
        style: &ChartStyle,
    ) -> DrawCommandList {
        let mut list = DrawCommandList::new();
        let plot = style.plot_area();

        list.begin_layer(Layer::Frame);
        list.fill_rect(0.0, 0.0, style.width, style.height, style.background);
        list.fill_rect(plot.x, plot.y, plot.width, plot.height, style.plot_background);

        if plot.width <= 0.0 || plot.height <= 0.0 {
            return list;
        }

        let (value_min, value_max) = resolve_value_range(model, viewport, style);
        let scale = Scale::new(plot, viewport.time, value_min, value_max);

        draw_grid(&mut list, &scale, style);
        draw_axes(&mut list, &scale, style);

        for (index, series) in model.series().iter().enumerate() {
            if style.is_hidden(series.id()) {
                continue;
            }
            let visible = series.visible(viewport.time);
            if visible.is_empty() {
                continue;
            }

            let color = style.color_for(series, index);
            list.begin_layer(Layer::Series(series.id().to_string()));

            let columns = downsample::column_count(plot.width, style.downsample_threshold);
            if visible.len() > columns {
                let buckets = downsample::downsample(visible, viewport.time, columns);
                draw_band(&mut list, &scale, &buckets, columns, color, style);
            } else {
                draw_series(&mut list, &scale, series, visible, color, style);
            }
        }

        list
    }

    /// Render hover crosshair, zoom selection, tooltip and status message.
    pub fn render_overlay(
        &self,
        viewport: &Viewport,
        style: &ChartStyle,
        overlay: &Overlay<'_>,
    ) -> DrawCommandList {
        let mut list = DrawCommandList::new();
        let plot = style.plot_area();
        if plot.width <= 0.0 || plot.height <= 0.0 {
            return list;
        }
        let scale = Scale::new(plot, viewport.time, 0.0, 1.0);

        list.begin_layer(Layer::Overlay);

        if let Some(t) = overlay.hover.filter(|&t| viewport.time.contains(t)) {
            let x = scale.time_to_x(t);
            list.line((x, plot.y), (x, plot.bottom()), style.crosshair_color, 1.0);
        }

        if let Some(rect) = overlay.selection {
            list.fill_rect(rect.x, rect.y, rect.width, rect.height, style.selection_color);
        }

        if let Some(message) = overlay.status_message {
            list.text(
                plot.x + plot.width / 2.0,
                plot.y + plot.height / 2.0,
                message,
                style.text_color,
                16.0,
                TextAlign::Center,
            );
        }

        if let Some(content) = overlay.tooltip {
            let anchor = overlay
                .hover
                .map(|t| scale.time_to_x(t))
                .unwrap_or(plot.x);
            content.draw(&mut list, anchor, plot, style);
        }

        list
    }
}

/// Render the base frame with a default renderer.
pub fn render(model: &TimeSeriesModel, viewport: &Viewport, style: &ChartStyle) -> DrawCommandList {
    ChartRenderer.render(model, viewport, style)
}

/// Resolve the value axis for a viewport.
///
/// `Auto` takes min/max of visible present values of shown series and adds
/// the style margin; no values resolves to `[0, 1]`.
pub fn resolve_value_range(
    model: &TimeSeriesModel,
    viewport: &Viewport,
    style: &ChartStyle,
) -> (f64, f64) {
    if let ValueRange::Fixed { min, max } = viewport.value {
        if min.is_finite() && max.is_finite() {
            return if min < max {
                (min, max)
            } else {
                (min - 0.5, min + 0.5)
            };
        }
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for series in model.series() {
        if style.is_hidden(series.id()) {
            continue;
        }
        for v in series.visible(viewport.time).iter().filter_map(|s| s.value) {
            min = min.min(v);
            max = max.max(v);
        }
    }

    if min > max {
        return (0.0, 1.0);
    }

    let margin = style.value_range_margin;
    // Half-span keeps the difference finite for values near f64::MAX.
    let half_span = max / 2.0 - min / 2.0;
    let pad = if half_span > 0.0 {
        half_span * 2.0 * margin
    } else if min == 0.0 || margin == 0.0 {
        0.5
    } else {
        min.abs() * margin
    };
    ((min - pad).max(f64::MIN), (max + pad).min(f64::MAX))
}

fn draw_grid(list: &mut DrawCommandList, scale: &Scale, style: &ChartStyle) {
    let plot = scale.plot;
    list.begin_layer(Layer::Grid);

    let rows = style.grid_rows.max(1);
    for i in 0..=rows {
        let y = plot.y + (i as f32 / rows as f32) * plot.height;
        list.line((plot.x, y), (plot.right(), y), style.grid_color, 1.0);
    }

    let columns = style.grid_columns.max(1);
    for i in 0..=columns {
        let x = plot.x + (i as f32 / columns as f32) * plot.width;
        list.line((x, plot.y), (x, plot.bottom()), style.grid_color, 1.0);
    }
}

fn draw_axes(list: &mut DrawCommandList, scale: &Scale, style: &ChartStyle) {
    let plot = scale.plot;
    list.begin_layer(Layer::Axis);

    let rows = style.grid_rows.max(1);
    for i in 0..=rows {
        let y = plot.y + (i as f32 / rows as f32) * plot.height;
        let value = scale.y_to_value(y);
        list.text(
            plot.x - 6.0,
            y - 6.0,
            style.format_value(value),
            style.text_color,
            10.0,
            TextAlign::Right,
        );
    }

    let with_seconds = scale.time.span() <= HOUR_MS;
    let columns = style.grid_columns.max(1);
    for i in 0..=columns {
        let x = plot.x + (i as f32 / columns as f32) * plot.width;
        list.text(
            x,
            plot.bottom() + 8.0,
            format_clock(scale.x_to_time(x), with_seconds),
            style.text_color,
            10.0,
            TextAlign::Center,
        );
    }
}

/// Polyline (and area fill) through raw samples; missing values break the line.
fn draw_series(
    list: &mut DrawCommandList,
    scale: &Scale,
    series: &Series,
    visible: &[Sample],
    color: Rgba,
    style: &ChartStyle,
) {
    let mut runs: Vec<Vec<(f32, f32)>> = Vec::new();
    let mut current: Vec<(f32, f32)> = Vec::new();
    for sample in visible {
        match sample.value {
            Some(v) => current.push((scale.time_to_x(sample.timestamp), scale.value_to_y(v))),
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    if series.kind() == crate::model::SeriesKind::Area {
        let baseline = scale.value_to_y(0.0_f64.max(scale.value_min).min(scale.value_max));
        for run in runs.iter().filter(|r| r.len() > 1) {
            fill_area(list, run, baseline, color.with_alpha(0x40));
        }
    }

    stroke_runs(list, &runs, color, style.line_width);
}

/// Min-max band per column plus a last-value line.
fn draw_band(
    list: &mut DrawCommandList,
    scale: &Scale,
    buckets: &[Bucket],
    columns: usize,
    color: Rgba,
    style: &ChartStyle,
) {
    let plot = scale.plot;
    let column_width = plot.width / columns as f32;
    let band_color = color.with_alpha(0x60);

    let mut runs: Vec<Vec<(f32, f32)>> = Vec::new();
    let mut current: Vec<(f32, f32)> = Vec::new();

    for bucket in buckets {
        let (Some(min), Some(max), Some(last)) = (bucket.min, bucket.max, bucket.last) else {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            continue;
        };

        let left = plot.x + bucket.column as f32 * column_width;
        let top = scale.value_to_y(max);
        let bottom = scale.value_to_y(min);
        list.fill_rect(left, top, column_width, (bottom - top).max(1.0), band_color);

        current.push((left + column_width / 2.0, scale.value_to_y(last)));
    }
    if !current.is_empty() {
        runs.push(current);
    }

    stroke_runs(list, &runs, color, style.line_width);
}

fn fill_area(list: &mut DrawCommandList, run: &[(f32, f32)], baseline: f32, color: Rgba) {
    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return;
    };
    list.push(DrawCommand::BeginPath);
    list.push(DrawCommand::MoveTo {
        x: first.0,
        y: baseline,
    });
    for &(x, y) in run {
        list.push(DrawCommand::LineTo { x, y });
    }
    list.push(DrawCommand::LineTo {
        x: last.0,
        y: baseline,
    });
    list.push(DrawCommand::ClosePath);
    list.push(DrawCommand::Fill { color });
}

/// One path for all runs; single-point runs become dots.
fn stroke_runs(list: &mut DrawCommandList, runs: &[Vec<(f32, f32)>], color: Rgba, width: f32) {
    if runs.iter().any(|r| r.len() > 1) {
        list.push(DrawCommand::BeginPath);
        for run in runs.iter().filter(|r| r.len() > 1) {
            list.push(DrawCommand::MoveTo {
                x: run[0].0,
                y: run[0].1,
            });
            for &(x, y) in &run[1..] {
                list.push(DrawCommand::LineTo { x, y });
            }
        }
        list.push(DrawCommand::Stroke { color, width });
    }

    for run in runs.iter().filter(|r| r.len() == 1) {
        let (x, y) = run[0];
        list.fill_rect(x - width, y - width, width * 2.0, width * 2.0, color);
    }
}
