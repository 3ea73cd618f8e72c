//! Mounted charts, the sync bus they share and coalesced redraws.

use std::collections::BTreeSet;

use lindash_common::{ChartConfig, GroupConfig, ResultSet};

use crate::instance::{ChartInstance, LegendEntry, RenderedFrame};
use crate::interaction::{HoverUpdate, InputEvent};
use crate::model::{DataShapeError, RawSeries, TimeRange, TimeSeriesModel};
use crate::redraw::RedrawQueue;
use crate::sync_bus::{ChartId, HoverState, SyncBus};
use crate::tooltip::TooltipContent;

/// Owner of every chart instance and the bus between them.
///
/// All mutation goes through `&mut self`; changes only mark charts dirty and
/// [`Dashboard::flush`] renders each dirty chart once.
#[derive(Debug)]
pub struct Dashboard {
    config: ChartConfig,
    bus: SyncBus,
    charts: Vec<ChartInstance>,
    linked_groups: BTreeSet<String>,
    redraw: RedrawQueue,
    next_id: u64,
}

impl Dashboard {
    pub fn new(config: ChartConfig, groups: &[GroupConfig]) -> Self {
        let linked_groups = groups
            .iter()
            .filter(|g| g.linked_zoom)
            .map(|g| g.id.clone())
            .collect();
        Self {
            config,
            bus: SyncBus::new(),
            charts: Vec::new(),
            linked_groups,
            redraw: RedrawQueue::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn bus(&self) -> &SyncBus {
        &self.bus
    }

    /// Charts in mount order.
    pub fn charts(&self) -> &[ChartInstance] {
        &self.charts
    }

    pub fn chart(&self, id: &ChartId) -> Option<&ChartInstance> {
        self.charts.iter().find(|c| c.id() == id)
    }

    fn chart_mut(&mut self, id: &ChartId) -> Option<&mut ChartInstance> {
        let chart = self.charts.iter_mut().find(|c| c.id() == id);
        if chart.is_none() {
            tracing::debug!(chart = %id, "Ignoring update for unknown chart");
        }
        chart
    }

    /// Mount a new chart in `group` and schedule its first frame.
    pub fn on_mount(&mut self, group: &str, size: (f32, f32)) -> ChartId {
        self.next_id += 1;
        let id = ChartId::new(format!("chart-{}", self.next_id));

        let instance = ChartInstance::mount(&mut self.bus, group, id.clone(), &self.config, size);
        if self.linked_groups.contains(group) {
            self.bus.set_linked_zoom(group, true);
        }
        self.charts.push(instance);
        self.redraw.request(&id);
        id
    }

    /// Unmount a chart; its pending redraw is dropped.
    ///
    /// Returns `false` for an unknown id.
    pub fn on_unmount(&mut self, id: &ChartId) -> bool {
        let Some(index) = self.charts.iter().position(|c| c.id() == id) else {
            tracing::debug!(chart = %id, "Unmount of unknown chart");
            return false;
        };
        let instance = self.charts.remove(index);
        let group = instance.group().to_string();
        let owned_hover = self.bus.hover(&group).origin.as_ref() == Some(id);

        instance.unmount(&mut self.bus);
        self.redraw.cancel(id);

        // Others still show the crosshair of the departed chart.
        if owned_hover {
            let members = self.bus.members(&group);
            self.redraw.request_all(&members);
        }
        true
    }

    /// Enable or disable shared zoom for a group.
    pub fn set_linked_zoom(&mut self, group: &str, linked: bool) {
        if linked {
            self.linked_groups.insert(group.to_string());
        } else {
            self.linked_groups.remove(group);
        }
        self.bus.set_linked_zoom(group, linked);
        let members = self.bus.members(group);
        self.redraw.request_all(&members);
    }

    pub fn set_model(&mut self, id: &ChartId, model: TimeSeriesModel) {
        if let Some(chart) = self.chart_mut(id) {
            chart.set_model(model);
            self.redraw.request(id);
        }
    }

    /// Build and install a model; on error the chart shows the reason.
    pub fn set_data(
        &mut self,
        id: &ChartId,
        raw: Vec<RawSeries>,
        range: TimeRange,
    ) -> Result<(), DataShapeError> {
        let Some(chart) = self.chart_mut(id) else {
            return Ok(());
        };
        let result = chart.set_data(raw, range);
        self.redraw.request(id);
        result
    }

    pub fn set_result_set(&mut self, id: &ChartId, rs: &ResultSet) -> Result<(), DataShapeError> {
        let Some(chart) = self.chart_mut(id) else {
            return Ok(());
        };
        let result = chart.set_result_set(rs);
        self.redraw.request(id);
        result
    }

    pub fn set_loading(&mut self, id: &ChartId) {
        if let Some(chart) = self.chart_mut(id) {
            chart.set_loading();
            self.redraw.request(id);
        }
    }

    /// Resize a chart; returns whether its size changed.
    pub fn resize(&mut self, id: &ChartId, width: f32, height: f32) -> bool {
        let Some(chart) = self.chart_mut(id) else {
            return false;
        };
        if chart.size() == (width, height) {
            return false;
        }
        chart.resize(width, height);
        self.redraw.request(id);
        true
    }

    /// Toggle a series of one chart; returns whether it is now hidden.
    pub fn toggle_series(&mut self, id: &ChartId, series: &str) -> bool {
        let Some(chart) = self.chart_mut(id) else {
            return false;
        };
        let hidden = chart.toggle_series(series);
        self.redraw.request(id);
        hidden
    }

    /// Route an input event to a chart and propagate its effects.
    ///
    /// Returns whether anything was scheduled for redraw.
    pub fn handle_input(&mut self, id: &ChartId, event: InputEvent) -> bool {
        let Some(chart) = self.charts.iter_mut().find(|c| c.id() == id) else {
            tracing::debug!(chart = %id, ?event, "Input for unknown chart");
            return false;
        };

        let before = chart.interaction_state();
        let response = chart.handle_input(event, &self.bus);
        let state_changed = chart.interaction_state() != before;
        let group = chart.group().to_string();

        if state_changed || !response.is_empty() {
            self.redraw.request(id);
        }

        if let Some(update) = response.hover {
            let current = self.bus.hover(&group);
            let next = match update {
                HoverUpdate::Set(t) => Some(HoverState {
                    timestamp: Some(t),
                    origin: Some(id.clone()),
                }),
                // Only the chart that owns the hover may clear it.
                HoverUpdate::Clear if current.origin.as_ref() == Some(id) => {
                    Some(HoverState::default())
                }
                HoverUpdate::Clear => None,
            };
            if let Some(next) = next.filter(|next| *next != current) {
                let notified = self.bus.publish_hover(&group, next.timestamp, id);
                self.redraw.request_all(&notified);
            }
        }

        if let Some(viewport) = response.viewport {
            let notified = self.bus.publish_viewport(&group, viewport, id);
            self.redraw.request_all(&notified);
        }

        !self.redraw.is_empty()
    }

    pub fn is_dirty(&self, id: &ChartId) -> bool {
        self.redraw.is_pending(id)
    }

    /// Render every dirty chart once, in request order.
    pub fn flush(&mut self) -> Vec<(ChartId, RenderedFrame)> {
        let dirty = self.redraw.drain();
        if dirty.is_empty() {
            return Vec::new();
        }

        let frames: Vec<_> = dirty
            .into_iter()
            .filter_map(|id| {
                let chart = self.charts.iter_mut().find(|c| *c.id() == id)?;
                let frame = chart.render(&self.bus);
                Some((id, frame))
            })
            .collect();
        tracing::debug!(frames = frames.len(), "Flushed redraws");
        frames
    }

    pub fn tooltip(&mut self, id: &ChartId) -> Option<TooltipContent> {
        let chart = self.charts.iter_mut().find(|c| c.id() == id)?;
        chart.tooltip(&self.bus)
    }

    pub fn legend(&self, id: &ChartId) -> Vec<LegendEntry> {
        self.chart(id)
            .map(|c| c.legend(&self.bus))
            .unwrap_or_default()
    }
}
