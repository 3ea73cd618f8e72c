//! Load status and per-series statistics shown around a chart.

use crate::model::{Series, TimeRange, TimeSeriesModel};

/// Load state of a chart's data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChartStatus {
    /// Waiting for the first model.
    #[default]
    Loading,
    /// Model with data.
    Ready,
    /// Model without any present value.
    Empty,
    /// The data could not be turned into a model.
    Error(String),
}

impl ChartStatus {
    /// Status for a freshly built model.
    pub fn for_model(model: &TimeSeriesModel) -> Self {
        if model.has_values() {
            ChartStatus::Ready
        } else {
            ChartStatus::Empty
        }
    }

    /// Message drawn over the plot, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            ChartStatus::Loading => Some("Loading...".to_string()),
            ChartStatus::Ready => None,
            ChartStatus::Empty => Some("No data".to_string()),
            ChartStatus::Error(reason) => Some(format!("No data: {}", reason)),
        }
    }

    /// Short label for headers.
    pub fn label(&self) -> &'static str {
        match self {
            ChartStatus::Loading => "loading",
            ChartStatus::Ready => "ok",
            ChartStatus::Empty => "empty",
            ChartStatus::Error(_) => "error",
        }
    }
}

/// Statistics of one series over a time range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStats {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Average value.
    pub avg: f64,
    /// Most recent value.
    pub current: Option<f64>,
    /// Number of present values.
    pub count: usize,
}

impl SeriesStats {
    /// Compute over the present values of `series` inside `range`.
    pub fn compute(series: &Series, range: TimeRange) -> Self {
        let values: Vec<f64> = series
            .visible(range)
            .iter()
            .filter_map(|s| s.value)
            .collect();

        if values.is_empty() {
            return SeriesStats::default();
        }

        let sum: f64 = values.iter().sum();
        let count = values.len();

        SeriesStats {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg: sum / count as f64,
            current: values.last().copied(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawSeries;

    #[test]
    fn test_series_stats() {
        let model = TimeSeriesModel::build(
            vec![RawSeries::new(
                "cpu",
                vec![(5000, Some(10.0)), (6000, Some(20.0)), (7000, None), (8000, Some(15.0))],
            )],
            TimeRange::new(0, 10_000),
        )
        .unwrap();
        let series = model.get("cpu").unwrap();

        let stats = SeriesStats::compute(series, model.range());
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 20.0);
        assert_eq!(stats.avg, 15.0);
        assert_eq!(stats.current, Some(15.0));

        let none = SeriesStats::compute(series, TimeRange::new(0, 1000));
        assert_eq!(none, SeriesStats::default());
    }

    #[test]
    fn test_status_for_model() {
        let empty = TimeSeriesModel::empty(TimeRange::new(0, 1));
        assert_eq!(ChartStatus::for_model(&empty), ChartStatus::Empty);

        let missing_only = TimeSeriesModel::build(
            vec![RawSeries::new("a", vec![(0, None)])],
            TimeRange::new(0, 1),
        )
        .unwrap();
        assert_eq!(ChartStatus::for_model(&missing_only), ChartStatus::Empty);
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(ChartStatus::Ready.message(), None);
        assert_eq!(ChartStatus::Empty.message().as_deref(), Some("No data"));
        assert_eq!(
            ChartStatus::Error("bad".to_string()).message().as_deref(),
            Some("No data: bad")
        );
        assert_eq!(ChartStatus::Loading.label(), "loading");
    }
}
