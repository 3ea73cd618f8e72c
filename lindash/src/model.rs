//! Immutable time-series model built from raw query results.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lindash_common::ResultSet;

/// Timestamp in Unix epoch milliseconds.
pub type Timestamp = i64;

/// Inclusive time range in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Length of the range in milliseconds, saturating at `i64::MAX`.
    pub fn span(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        t >= self.start && t <= self.end
    }

    /// Shift by `delta` while staying inside `bounds`.
    ///
    /// The span is preserved when it fits; a range wider than `bounds`
    /// collapses onto `bounds`.
    pub fn shifted_within(&self, delta: i64, bounds: TimeRange) -> TimeRange {
        let span = self.span();
        if span >= bounds.span() {
            return bounds;
        }
        let start = self
            .start
            .saturating_add(delta)
            .clamp(bounds.start, bounds.end.saturating_sub(span));
        TimeRange::new(start, start.saturating_add(span))
    }

    /// Intersection with `bounds`; `None` if they don't overlap.
    pub fn clamped_to(&self, bounds: TimeRange) -> Option<TimeRange> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start <= end).then(|| TimeRange::new(start, end))
    }
}

/// One sample; `value == None` marks missing data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }

    pub fn missing(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }
}

/// How a series is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[default]
    Line,
    Area,
}

/// Unvalidated input for one series.
#[derive(Debug, Clone, Default)]
pub struct RawSeries {
    pub id: String,
    pub points: Vec<(Timestamp, Option<f64>)>,
    pub kind: SeriesKind,
    /// Explicit `#rrggbb` color; falls back to the chart palette.
    pub color: Option<String>,
}

impl RawSeries {
    pub fn new(id: impl Into<String>, points: Vec<(Timestamp, Option<f64>)>) -> Self {
        Self {
            id: id.into(),
            points,
            ..Self::default()
        }
    }

    /// Build from points that are all present.
    pub fn from_values(id: impl Into<String>, points: &[(Timestamp, f64)]) -> Self {
        Self::new(id, points.iter().map(|&(t, v)| (t, Some(v))).collect())
    }

    pub fn with_kind(mut self, kind: SeriesKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Malformed input rejected by [`TimeSeriesModel::build`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataShapeError {
    #[error("declared range is inverted: start {start} > end {end}")]
    InvertedRange { start: Timestamp, end: Timestamp },

    #[error("declared range {start}..{end} is wider than i64 milliseconds")]
    RangeTooWide { start: Timestamp, end: Timestamp },

    #[error("duplicate series id '{0}'")]
    DuplicateSeries(String),

    #[error("series '{series}' has duplicate timestamp {timestamp}")]
    DuplicateTimestamp { series: String, timestamp: Timestamp },

    #[error("series '{series}' has a point at {timestamp} outside [{start}, {end}]")]
    OutOfRange {
        series: String,
        timestamp: Timestamp,
        start: Timestamp,
        end: Timestamp,
    },

    #[error("series '{series}' has a non-finite value at {timestamp}")]
    NonFiniteValue { series: String, timestamp: Timestamp },

    #[error("invalid result set: {0}")]
    ResultSet(String),
}

/// Validated, time-ordered series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    id: String,
    samples: Vec<Sample>,
    kind: SeriesKind,
    color: Option<String>,
}

impl Series {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples whose timestamps fall inside `range`.
    pub fn visible(&self, range: TimeRange) -> &[Sample] {
        let lo = self.samples.partition_point(|s| s.timestamp < range.start);
        let hi = self.samples.partition_point(|s| s.timestamp <= range.end);
        &self.samples[lo..hi.max(lo)]
    }

    /// Sample closest to `t`; ties go to the earlier sample.
    pub fn sample_nearest(&self, t: Timestamp) -> Option<Sample> {
        let idx = self.samples.partition_point(|s| s.timestamp < t);
        let after = self.samples.get(idx);
        let before = idx.checked_sub(1).and_then(|i| self.samples.get(i));

        match (before, after) {
            (Some(b), Some(a)) => {
                if a.timestamp - t < t - b.timestamp {
                    Some(*a)
                } else {
                    Some(*b)
                }
            }
            (Some(b), None) => Some(*b),
            (None, Some(a)) => Some(*a),
            (None, None) => None,
        }
    }
}

/// Process-unique identity of a model, used as part of render cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

impl ModelId {
    fn next() -> Self {
        ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Series on a common declared time axis.
///
/// Never mutated after construction; a new fetch builds a new model.
#[derive(Debug, Clone)]
pub struct TimeSeriesModel {
    id: ModelId,
    range: TimeRange,
    series: Vec<Series>,
    index: HashMap<String, usize>,
}

impl TimeSeriesModel {
    /// Validate raw series against the declared range.
    ///
    /// Each series is sorted by timestamp once; duplicates are not removed.
    pub fn build(raw: Vec<RawSeries>, declared: TimeRange) -> Result<Self, DataShapeError> {
        if declared.start > declared.end {
            return Err(DataShapeError::InvertedRange {
                start: declared.start,
                end: declared.end,
            });
        }
        if declared.end.checked_sub(declared.start).is_none() {
            return Err(DataShapeError::RangeTooWide {
                start: declared.start,
                end: declared.end,
            });
        }

        let mut series = Vec::with_capacity(raw.len());
        let mut index = HashMap::with_capacity(raw.len());

        for raw_series in raw {
            if index.contains_key(&raw_series.id) {
                return Err(DataShapeError::DuplicateSeries(raw_series.id));
            }

            let mut points = raw_series.points;
            points.sort_by_key(|&(t, _)| t);

            for pair in points.windows(2) {
                if pair[0].0 == pair[1].0 {
                    return Err(DataShapeError::DuplicateTimestamp {
                        series: raw_series.id,
                        timestamp: pair[0].0,
                    });
                }
            }

            let mut samples = Vec::with_capacity(points.len());
            for (timestamp, value) in points {
                if !declared.contains(timestamp) {
                    return Err(DataShapeError::OutOfRange {
                        series: raw_series.id,
                        timestamp,
                        start: declared.start,
                        end: declared.end,
                    });
                }
                if value.is_some_and(|v| !v.is_finite()) {
                    return Err(DataShapeError::NonFiniteValue {
                        series: raw_series.id,
                        timestamp,
                    });
                }
                samples.push(Sample { timestamp, value });
            }

            index.insert(raw_series.id.clone(), series.len());
            series.push(Series {
                id: raw_series.id,
                samples,
                kind: raw_series.kind,
                color: raw_series.color,
            });
        }

        let model = Self {
            id: ModelId::next(),
            range: declared,
            series,
            index,
        };
        tracing::debug!(
            model = model.id.0,
            series = model.series.len(),
            points = model.point_count(),
            "Built time-series model"
        );
        Ok(model)
    }

    /// Model with no series over `range`.
    pub fn empty(range: TimeRange) -> Self {
        Self {
            id: ModelId::next(),
            range,
            series: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Flatten a broker result set: one series per (tag set, field).
    ///
    /// With a positive interval, every slot without a value becomes a
    /// missing sample so the renderer shows the gap.
    pub fn from_result_set(rs: &ResultSet) -> Result<Self, DataShapeError> {
        rs.validate()
            .map_err(|e| DataShapeError::ResultSet(e.to_string()))?;

        let mut raw = Vec::with_capacity(rs.line_count());
        for result_series in &rs.series {
            for (field, points) in &result_series.fields {
                let mut values: Vec<(Timestamp, Option<f64>)> =
                    points.iter().map(|(&t, &v)| (t, v)).collect();
                for slot in rs.slots() {
                    if !points.contains_key(&slot) {
                        values.push((slot, None));
                    }
                }
                raw.push(RawSeries::new(
                    result_series.line_key(&rs.metric_name, field),
                    values,
                ));
            }
        }

        Self::build(raw, TimeRange::new(rs.start_time, rs.end_time))
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Declared time range; also the pan/zoom bounds of charts showing the model.
    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn get(&self, id: &str) -> Option<&Series> {
        self.index.get(id).map(|&i| &self.series[i])
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.samples.len()).sum()
    }

    /// Whether any series carries at least one present value.
    pub fn has_values(&self) -> bool {
        self.series
            .iter()
            .any(|s| s.samples.iter().any(|p| p.value.is_some()))
    }

    /// Nearest sample of `series_id` to `t`, missing markers included.
    pub fn sample_nearest(&self, series_id: &str, t: Timestamp) -> Option<Sample> {
        self.get(series_id)?.sample_nearest(t)
    }
}
