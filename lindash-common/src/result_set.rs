use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Largest number of interval slots a result set may span.
///
/// Missing slots are filled with gap markers, so this bounds the memory a
/// single response can claim.
pub const MAX_SLOTS: i64 = 100_000;

/// Raw result of a metric query as returned by the broker.
///
/// Each series is identified by its tag set; each field of a series maps
/// timestamps (Unix epoch milliseconds) to values. A `null` value marks a slot
/// the storage knows about but has no data for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    /// Metric name (e.g., "lindb.runtime.cpu").
    #[serde(default)]
    pub metric_name: String,

    /// Tag keys the query grouped by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,

    /// Field names selected by the query.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    /// Start of the queried time range (inclusive, ms).
    #[serde(default)]
    pub start_time: i64,

    /// End of the queried time range (inclusive, ms).
    #[serde(default)]
    pub end_time: i64,

    /// Sampling interval in milliseconds (0 when unknown).
    #[serde(default)]
    pub interval: i64,

    /// Result series.
    #[serde(default)]
    pub series: Vec<ResultSeries>,
}

/// One tag combination of a [`ResultSet`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSeries {
    /// Tag key/value pairs identifying this series.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    /// Field name -> (timestamp -> value).
    #[serde(default)]
    pub fields: BTreeMap<String, BTreeMap<i64, Option<f64>>>,
}

impl ResultSet {
    /// Create an empty result set for a metric and time range.
    pub fn new(metric_name: impl Into<String>, start_time: i64, end_time: i64) -> Self {
        Self {
            metric_name: metric_name.into(),
            start_time,
            end_time,
            ..Self::default()
        }
    }

    /// Set the sampling interval.
    pub fn with_interval(mut self, interval: i64) -> Self {
        self.interval = interval;
        self
    }

    /// Append a series.
    pub fn with_series(mut self, series: ResultSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Check the header fields for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.start_time > self.end_time {
            return Err(self.invalid(format!(
                "start time {} is after end time {}",
                self.start_time, self.end_time
            )));
        }
        if self.interval < 0 {
            return Err(self.invalid(format!("negative interval {}", self.interval)));
        }
        let Some(span) = self.end_time.checked_sub(self.start_time) else {
            return Err(self.invalid(format!(
                "time range {}..{} is too wide",
                self.start_time, self.end_time
            )));
        };
        if self.interval > 0 && span / self.interval >= MAX_SLOTS {
            return Err(self.invalid(format!(
                "interval {} over {} ms exceeds {} slots",
                self.interval, span, MAX_SLOTS
            )));
        }
        Ok(())
    }

    /// Timestamps of every interval slot in `[start_time, end_time]`.
    ///
    /// Empty when the interval is unknown. Capped at [`MAX_SLOTS`].
    pub fn slots(&self) -> impl Iterator<Item = i64> + '_ {
        let step = self.interval;
        let count = match self.end_time.checked_sub(self.start_time) {
            Some(span) if step > 0 && span >= 0 => (span / step + 1).min(MAX_SLOTS) as usize,
            _ => 0,
        };
        (0..count).map(move |i| self.start_time + i as i64 * step)
    }

    /// Total number of (series, field) pairs.
    pub fn line_count(&self) -> usize {
        self.series.iter().map(|s| s.fields.len()).sum()
    }

    fn invalid(&self, reason: String) -> Error {
        Error::ResultSet {
            metric: self.metric_name.clone(),
            reason,
        }
    }
}

impl ResultSeries {
    /// Create a series with no tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field with its points.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        points: impl IntoIterator<Item = (i64, Option<f64>)>,
    ) -> Self {
        self.fields
            .insert(name.into(), points.into_iter().collect());
        self
    }

    /// Display key for one field of this series, e.g. `cpu.usage{host=a,zone=b}`.
    pub fn line_key(&self, metric: &str, field: &str) -> String {
        let mut key = if metric.is_empty() {
            field.to_string()
        } else {
            format!("{metric}.{field}")
        };
        if !self.tags.is_empty() {
            let tags: Vec<String> = self.tags.iter().map(|(k, v)| format!("{k}={v}")).collect();
            key.push('{');
            key.push_str(&tags.join(","));
            key.push('}');
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_broker_json() {
        let json = r#"{
            "metricName": "lindb.runtime.cpu",
            "groupBy": ["host"],
            "fields": ["usage"],
            "startTime": 0,
            "endTime": 20000,
            "interval": 10000,
            "series": [
                {"tags": {"host": "node1"}, "fields": {"usage": {"0": 1.5, "10000": null}}}
            ]
        }"#;

        let rs: ResultSet = serde_json::from_str(json).unwrap();

        assert_eq!(rs.metric_name, "lindb.runtime.cpu");
        assert_eq!(rs.interval, 10_000);
        assert_eq!(rs.series.len(), 1);
        let usage = &rs.series[0].fields["usage"];
        assert_eq!(usage.get(&0), Some(&Some(1.5)));
        assert_eq!(usage.get(&10_000), Some(&None));
        assert!(rs.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let rs = ResultSet::new("m", 100, 50);
        let err = rs.validate().unwrap_err();
        assert!(err.to_string().contains("start time 100 is after end time 50"));
    }

    #[test]
    fn test_validate_rejects_negative_interval() {
        let rs = ResultSet::new("m", 0, 50).with_interval(-10);
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_slots() {
        let rs = ResultSet::new("m", 0, 25).with_interval(10);
        assert_eq!(rs.slots().collect::<Vec<_>>(), vec![0, 10, 20]);

        let no_interval = ResultSet::new("m", 0, 25);
        assert_eq!(no_interval.slots().count(), 0);
    }

    #[test]
    fn test_validate_rejects_too_many_slots() {
        let rs = ResultSet::new("m", 0, 1_000_000_000_000).with_interval(1);
        let err = rs.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds 100000 slots"));
        assert_eq!(rs.slots().size_hint(), (MAX_SLOTS as usize, Some(MAX_SLOTS as usize)));

        let day = ResultSet::new("m", 0, 86_399_000).with_interval(1_000);
        assert!(day.validate().is_ok());
        assert_eq!(day.slots().count(), 86_400);
    }

    #[test]
    fn test_validate_rejects_overflowing_range() {
        let rs = ResultSet::new("m", i64::MIN, i64::MAX).with_interval(1_000);
        assert!(rs.validate().unwrap_err().to_string().contains("too wide"));
        assert_eq!(rs.slots().count(), 0);
    }

    #[test]
    fn test_line_key() {
        let series = ResultSeries::new()
            .with_tag("zone", "b")
            .with_tag("host", "a");
        assert_eq!(series.line_key("cpu", "usage"), "cpu.usage{host=a,zone=b}");
        assert_eq!(ResultSeries::new().line_key("", "usage"), "usage");
    }

    #[test]
    fn test_line_count() {
        let rs = ResultSet::new("m", 0, 10)
            .with_series(
                ResultSeries::new()
                    .with_field("a", [(0, Some(1.0))])
                    .with_field("b", [(0, Some(2.0))]),
            )
            .with_series(ResultSeries::new().with_field("a", [(0, Some(3.0))]));
        assert_eq!(rs.line_count(), 3);
    }
}
