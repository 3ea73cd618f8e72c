//! Per-pixel-column aggregation of dense series.

use crate::model::{Sample, TimeRange, Timestamp};

/// Aggregate of the samples falling into one pixel column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub column: usize,
    /// `None` when every sample of the column is missing.
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Last present value of the column.
    pub last: Option<f64>,
    pub count: usize,
}

impl Bucket {
    fn start(column: usize, sample: &Sample) -> Self {
        Self {
            column,
            min: sample.value,
            max: sample.value,
            last: sample.value,
            count: 1,
        }
    }

    fn absorb(&mut self, sample: &Sample) {
        self.count += 1;
        if let Some(v) = sample.value {
            self.min = Some(self.min.map_or(v, |m| m.min(v)));
            self.max = Some(self.max.map_or(v, |m| m.max(v)));
            self.last = Some(v);
        }
    }

    /// Whether this column only holds missing markers.
    pub fn is_gap(&self) -> bool {
        self.min.is_none()
    }
}

/// Number of aggregate columns for a plot width.
pub fn column_count(plot_width: f32, pixels_per_aggregate: f32) -> usize {
    let per = pixels_per_aggregate.max(1.0);
    ((plot_width / per).floor() as usize).max(1)
}

/// Column of `t` when `range` is split into `columns` equal slices.
pub fn column_of(t: Timestamp, range: TimeRange, columns: usize) -> usize {
    let span = range.span().max(1) as f64;
    let ratio = (t as f64 - range.start as f64) / span;
    ((ratio * columns as f64).floor().max(0.0) as usize).min(columns - 1)
}

/// Aggregate time-ordered `samples` into at most `columns` buckets.
///
/// Columns without samples produce no bucket. Every present value ends up
/// inside the min/max of its bucket, so spikes survive aggregation.
pub fn downsample(samples: &[Sample], range: TimeRange, columns: usize) -> Vec<Bucket> {
    let columns = columns.max(1);
    let mut buckets: Vec<Bucket> = Vec::with_capacity(columns.min(samples.len()));

    for sample in samples {
        let column = column_of(sample.timestamp, range, columns);
        match buckets.last_mut() {
            Some(bucket) if bucket.column == column => bucket.absorb(sample),
            _ => buckets.push(Bucket::start(column, sample)),
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: i64) -> Vec<Sample> {
        (0..n).map(|i| Sample::new(i, i as f64)).collect()
    }

    #[test]
    fn test_column_count() {
        assert_eq!(column_count(100.0, 2.0), 50);
        assert_eq!(column_count(1.0, 4.0), 1);
        assert_eq!(column_count(100.0, 0.0), 100);
    }

    #[test]
    fn test_buckets_cover_all_samples() {
        let samples = ramp(1000);
        let buckets = downsample(&samples, TimeRange::new(0, 999), 10);

        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 1000);
        assert_eq!(buckets[0].min, Some(0.0));
        assert_eq!(buckets[9].max, Some(999.0));
        assert_eq!(buckets[9].last, Some(999.0));
    }

    #[test]
    fn test_spike_survives() {
        let mut samples: Vec<Sample> = (0..10_000).map(|i| Sample::new(i, 1.0)).collect();
        samples[4321].value = Some(500.0);
        samples[7777].value = Some(-300.0);

        let range = TimeRange::new(0, 9_999);
        let buckets = downsample(&samples, range, 37);

        let spike = buckets
            .iter()
            .find(|b| b.column == column_of(4321, range, 37))
            .unwrap();
        assert_eq!(spike.max, Some(500.0));

        let dip = buckets
            .iter()
            .find(|b| b.column == column_of(7777, range, 37))
            .unwrap();
        assert_eq!(dip.min, Some(-300.0));
    }

    #[test]
    fn test_missing_only_column_is_gap() {
        let samples = vec![
            Sample::new(0, 1.0),
            Sample::missing(50),
            Sample::missing(60),
            Sample::new(99, 2.0),
        ];
        let buckets = downsample(&samples, TimeRange::new(0, 99), 3);

        assert_eq!(buckets.len(), 3);
        assert!(!buckets[0].is_gap());
        assert!(buckets[1].is_gap());
        assert_eq!(buckets[1].count, 2);
        assert_eq!(buckets[2].last, Some(2.0));
    }
}
