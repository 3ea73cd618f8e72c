//! Demo data generator.
//!
//! Produces LinDB-style query results with time-varying values, occasional
//! spikes and missing slots, so the dashboard can run without a broker.

use std::f64::consts::PI;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use lindash_common::{DemoConfig, ResultSeries, ResultSet};

/// One generated metric: name, field, base value, amplitude, upper bound.
struct MetricSpec {
    name: &'static str,
    field: &'static str,
    base: f64,
    amplitude: f64,
    max: Option<f64>,
}

const METRICS: &[MetricSpec] = &[
    MetricSpec {
        name: "system.cpu",
        field: "usage",
        base: 35.0,
        amplitude: 20.0,
        max: Some(100.0),
    },
    MetricSpec {
        name: "system.memory",
        field: "used_percent",
        base: 62.0,
        amplitude: 6.0,
        max: Some(100.0),
    },
    MetricSpec {
        name: "system.disk",
        field: "io_util",
        base: 18.0,
        amplitude: 12.0,
        max: Some(100.0),
    },
    MetricSpec {
        name: "system.net",
        field: "in_bytes",
        base: 2_500_000.0,
        amplitude: 1_500_000.0,
        max: None,
    },
];

const HOSTS: &[&str] = &["server01", "server02"];

/// One slot in this many is left empty.
const GAP_ONE_IN: u32 = 250;
/// One slot in this many carries a spike.
const SPIKE_ONE_IN: u32 = 900;

/// Stateful generator of demo query results.
pub struct DemoSimulator {
    rng: SmallRng,
    config: DemoConfig,
    /// Per-host phase so hosts don't move in lockstep.
    phases: Vec<f64>,
    refreshes: u64,
}

impl DemoSimulator {
    /// Create a generator seeded from system entropy.
    pub fn new(config: DemoConfig) -> Self {
        Self::from_rng(config, SmallRng::from_os_rng())
    }

    /// Create a reproducible generator.
    pub fn with_seed(config: DemoConfig, seed: u64) -> Self {
        Self::from_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(config: DemoConfig, mut rng: SmallRng) -> Self {
        let phases = (0..HOSTS.len()).map(|_| rng.random_range(0.0..PI)).collect();
        Self {
            rng,
            config,
            phases,
            refreshes: 0,
        }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Metric shown by the chart at `index`.
    pub fn metric_name(index: usize) -> &'static str {
        METRICS[index % METRICS.len()].name
    }

    /// Generate the result set of chart `index` for the window ending at `now_ms`.
    pub fn query(&mut self, index: usize, now_ms: i64) -> ResultSet {
        let spec = &METRICS[index % METRICS.len()];
        let interval = self.config.interval_ms.max(1);
        let points = self.config.points.max(1) as i64;

        let end = now_ms - now_ms.rem_euclid(interval);
        let start = end - (points - 1) * interval;
        let mut rs = ResultSet::new(spec.name, start, end).with_interval(interval);
        rs.group_by = vec!["host".to_string()];
        rs.fields = vec![spec.field.to_string()];

        for (host_index, host) in HOSTS.iter().enumerate() {
            let phase = self.phases[host_index] + index as f64;
            let mut values = Vec::with_capacity(points as usize);
            for slot in 0..points {
                let timestamp = start + slot * interval;
                if self.rng.random_range(0..GAP_ONE_IN) == 0 {
                    continue;
                }
                values.push((timestamp, Some(self.sample(spec, timestamp, phase))));
            }
            rs = rs.with_series(
                ResultSeries::new()
                    .with_tag("host", *host)
                    .with_field(spec.field, values),
            );
        }

        self.refreshes += 1;
        tracing::debug!(
            metric = spec.name,
            start,
            end,
            refresh = self.refreshes,
            "Generated demo result set"
        );
        rs
    }

    fn sample(&mut self, spec: &MetricSpec, timestamp: i64, phase: f64) -> f64 {
        // One oscillation every ten minutes plus a faster ripple.
        let t = timestamp as f64 / 600_000.0 * 2.0 * PI;
        let wave = (t + phase).sin() + 0.3 * (t * 7.0 + phase).sin();
        let noise = self.rng.random_range(-0.15..0.15);
        let mut value = spec.base + spec.amplitude * (wave + noise);

        if self.rng.random_range(0..SPIKE_ONE_IN) == 0 {
            value += spec.amplitude * self.rng.random_range(2.0..4.0);
        }

        let value = value.max(0.0);
        match spec.max {
            Some(max) => value.min(max),
            None => value,
        }
    }
}
