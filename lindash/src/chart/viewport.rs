//! Visible window of a chart and the pixel mapping derived from it.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::model::{TimeRange, Timestamp};

/// Vertical extent of a viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ValueRange {
    /// Resolved by the renderer from the visible data.
    #[default]
    Auto,
    Fixed { min: f64, max: f64 },
}

impl Hash for ValueRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ValueRange::Auto => 0u8.hash(state),
            ValueRange::Fixed { min, max } => {
                1u8.hash(state);
                min.to_bits().hash(state);
                max.to_bits().hash(state);
            }
        }
    }
}

/// Time/value window a chart renders.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub time: TimeRange,
    pub value: ValueRange,
}

impl Viewport {
    pub fn new(time: TimeRange, value: ValueRange) -> Self {
        Self { time, value }
    }

    /// Whole `bounds` with an auto value range.
    pub fn full(bounds: TimeRange) -> Self {
        Self::new(bounds, ValueRange::Auto)
    }

    /// Shift the time range by `delta` ms, clamped to `bounds`.
    pub fn panned(&self, delta: i64, bounds: TimeRange) -> Self {
        Self::new(self.time.shifted_within(delta, bounds), self.value)
    }

    /// Scale the time range around `anchor` by `factor` (< 1 zooms in).
    ///
    /// The result stays inside `bounds` and spans at least one millisecond.
    pub fn zoomed(&self, factor: f64, anchor: Timestamp, bounds: TimeRange) -> Self {
        let span = self.time.span().max(1) as f64;
        let new_span = (span * factor).round().clamp(1.0, bounds.span().max(1) as f64) as i64;
        let ratio = (anchor as f64 - self.time.start as f64) / span;
        let start = anchor.saturating_sub((new_span as f64 * ratio).round() as i64);
        let time = TimeRange::new(start, start.saturating_add(new_span)).shifted_within(0, bounds);
        Self::new(time, self.value)
    }
}

/// Pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two corners in any order.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self::new(
            a.0.min(b.0),
            a.1.min(b.1),
            (a.0 - b.0).abs(),
            (a.1 - b.1).abs(),
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Mapping between data coordinates and the plot rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub plot: Rect,
    pub time: TimeRange,
    pub value_min: f64,
    pub value_max: f64,
}

impl Scale {
    pub fn new(plot: Rect, time: TimeRange, value_min: f64, value_max: f64) -> Self {
        Self {
            plot,
            time,
            value_min,
            value_max,
        }
    }

    pub fn time_to_x(&self, t: Timestamp) -> f32 {
        let span = self.time.span().max(1) as f64;
        self.plot.x + ((t as f64 - self.time.start as f64) / span) as f32 * self.plot.width
    }

    pub fn x_to_time(&self, x: f32) -> Timestamp {
        let width = self.plot.width.max(1.0) as f64;
        let ratio = ((x - self.plot.x) as f64 / width).clamp(0.0, 1.0);
        self.time
            .start
            .saturating_add((ratio * self.time.span() as f64).round() as i64)
    }

    pub fn value_to_y(&self, v: f64) -> f32 {
        let half_span = self.value_max / 2.0 - self.value_min / 2.0;
        let ratio = if half_span > 0.0 {
            (v / 2.0 - self.value_min / 2.0) / half_span
        } else {
            0.5
        };
        self.plot.bottom() - ratio as f32 * self.plot.height
    }

    pub fn y_to_value(&self, y: f32) -> f64 {
        let height = self.plot.height.max(1.0) as f64;
        let ratio = ((self.plot.bottom() - y) as f64 / height).clamp(0.0, 1.0);
        self.value_min * (1.0 - ratio) + self.value_max * ratio
    }

    /// Milliseconds covered by one horizontal pixel.
    pub fn ms_per_pixel(&self) -> f64 {
        self.time.span() as f64 / self.plot.width.max(1.0) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> Scale {
        Scale::new(
            Rect::new(10.0, 10.0, 100.0, 50.0),
            TimeRange::new(0, 1000),
            0.0,
            10.0,
        )
    }

    #[test]
    fn test_time_mapping() {
        let s = scale();
        assert_eq!(s.time_to_x(0), 10.0);
        assert_eq!(s.time_to_x(1000), 110.0);
        assert_eq!(s.x_to_time(60.0), 500);
        assert_eq!(s.x_to_time(-100.0), 0);
        assert_eq!(s.ms_per_pixel(), 10.0);
    }

    #[test]
    fn test_value_mapping() {
        let s = scale();
        assert_eq!(s.value_to_y(0.0), 60.0);
        assert_eq!(s.value_to_y(10.0), 10.0);
        assert!((s.y_to_value(35.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_panned_clamps() {
        let bounds = TimeRange::new(0, 1000);
        let vp = Viewport::full(TimeRange::new(100, 300));
        assert_eq!(vp.panned(-1000, bounds).time, TimeRange::new(0, 200));
        assert_eq!(vp.panned(1000, bounds).time, TimeRange::new(800, 1000));
    }

    #[test]
    fn test_zoomed_around_anchor() {
        let bounds = TimeRange::new(0, 1000);
        let vp = Viewport::full(bounds);

        let zoomed = vp.zoomed(0.5, 500, bounds);
        assert_eq!(zoomed.time, TimeRange::new(250, 750));

        let out = zoomed.zoomed(10.0, 500, bounds);
        assert_eq!(out.time, bounds);

        let tiny = Viewport::full(TimeRange::new(10, 12)).zoomed(0.01, 11, bounds);
        assert_eq!(tiny.time.span(), 1);
    }

    #[test]
    fn test_rect_from_corners() {
        let r = Rect::from_corners((30.0, 5.0), (10.0, 25.0));
        assert_eq!(r, Rect::new(10.0, 5.0, 20.0, 20.0));
        assert!(r.contains(15.0, 10.0));
        assert!(!r.contains(31.0, 10.0));
    }
}
