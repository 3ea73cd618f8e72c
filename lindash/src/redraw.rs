//! Redraw requests coalesced per event-loop turn.

use std::collections::HashSet;

use crate::sync_bus::ChartId;

/// Charts that need a new frame, in first-request order.
#[derive(Debug, Default)]
pub struct RedrawQueue {
    order: Vec<ChartId>,
    pending: HashSet<ChartId>,
}

impl RedrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a chart dirty. Repeated requests within a turn are merged.
    pub fn request(&mut self, chart: &ChartId) {
        if self.pending.insert(chart.clone()) {
            self.order.push(chart.clone());
        }
    }

    pub fn request_all<'a>(&mut self, charts: impl IntoIterator<Item = &'a ChartId>) {
        for chart in charts {
            self.request(chart);
        }
    }

    /// Drop a pending request, e.g. for an unmounted chart.
    pub fn cancel(&mut self, chart: &ChartId) {
        if self.pending.remove(chart) {
            self.order.retain(|c| c != chart);
        }
    }

    pub fn is_pending(&self, chart: &ChartId) -> bool {
        self.pending.contains(chart)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Take every pending chart, leaving the queue empty for the next turn.
    pub fn drain(&mut self) -> Vec<ChartId> {
        self.pending.clear();
        std::mem::take(&mut self.order)
    }
}
