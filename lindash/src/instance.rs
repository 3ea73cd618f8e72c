//! One mounted chart: its model, local view state and bus registration.

use std::sync::Arc;

use lindash_common::{ChartConfig, ResultSet};

use crate::chart::{
    ChartRenderer, ChartStyle, DrawCommand, DrawCommandList, Overlay, RenderCache, Rgba, Scale,
    Viewport, resolve_value_range,
};
use crate::formatting::formatter;
use crate::interaction::{
    InputEvent, InteractionContext, InteractionController, InteractionState, Response,
};
use crate::model::{DataShapeError, RawSeries, TimeRange, TimeSeriesModel};
use crate::status::{ChartStatus, SeriesStats};
use crate::sync_bus::{ChartId, Subscription, SyncBus};
use crate::tooltip::{TooltipContent, TooltipPresenter};

/// Placeholder range used before the first model arrives.
const INITIAL_RANGE: TimeRange = TimeRange { start: 0, end: 60_000 };

/// Memoized base frame plus the overlay drawn on top of it.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub base: Arc<DrawCommandList>,
    pub overlay: DrawCommandList,
}

impl RenderedFrame {
    /// Base commands followed by overlay commands.
    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.base.iter().chain(self.overlay.iter())
    }

    pub fn texts(&self) -> Vec<&str> {
        let mut texts = self.base.texts();
        texts.extend(self.overlay.texts());
        texts
    }
}

/// Legend row for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub series: String,
    pub color: Rgba,
    pub hidden: bool,
    pub stats: SeriesStats,
}

/// A chart mounted on the dashboard.
#[derive(Debug)]
pub struct ChartInstance {
    id: ChartId,
    subscription: Subscription,
    model: Arc<TimeSeriesModel>,
    status: ChartStatus,
    viewport: Viewport,
    style: ChartStyle,
    controller: InteractionController,
    presenter: TooltipPresenter,
    cache: RenderCache,
}

impl ChartInstance {
    /// Create a chart and register it in `group`.
    pub fn mount(
        bus: &mut SyncBus,
        group: &str,
        id: ChartId,
        config: &ChartConfig,
        size: (f32, f32),
    ) -> Self {
        let subscription = bus.register(group, id.clone());
        tracing::info!(chart = %id, group = %group, "Mounted chart");

        Self {
            id,
            subscription,
            model: Arc::new(TimeSeriesModel::empty(INITIAL_RANGE)),
            status: ChartStatus::Loading,
            viewport: Viewport::full(INITIAL_RANGE),
            style: ChartStyle::from_config(config, size.0, size.1),
            controller: InteractionController::new(config.zoom_min_pixels),
            presenter: TooltipPresenter::new(
                config.snap_distance,
                formatter(config.value_format, config.decimals),
            ),
            cache: RenderCache::new(),
        }
    }

    /// Leave the sync group. The instance is consumed.
    pub fn unmount(self, bus: &mut SyncBus) {
        tracing::info!(chart = %self.id, group = %self.subscription.group(), "Unmounted chart");
        bus.unregister(self.subscription);
    }

    pub fn id(&self) -> &ChartId {
        &self.id
    }

    pub fn group(&self) -> &str {
        self.subscription.group()
    }

    pub fn model(&self) -> &Arc<TimeSeriesModel> {
        &self.model
    }

    pub fn status(&self) -> &ChartStatus {
        &self.status
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Replace the model. The local viewport is kept when it still fits.
    pub fn set_model(&mut self, model: TimeSeriesModel) {
        let bounds = model.range();
        if bounds != self.model.range() {
            self.viewport = match self.viewport.time.clamped_to(bounds) {
                Some(time) if self.status != ChartStatus::Loading => {
                    Viewport::new(time, self.viewport.value)
                }
                _ => Viewport::full(bounds),
            };
        }
        self.status = ChartStatus::for_model(&model);
        tracing::debug!(
            chart = %self.id,
            series = model.series().len(),
            points = model.point_count(),
            status = self.status.label(),
            "Model updated"
        );
        self.model = Arc::new(model);
    }

    /// Build a model from raw series.
    ///
    /// On failure the chart shows an empty model with the reason.
    pub fn set_data(&mut self, raw: Vec<RawSeries>, range: TimeRange) -> Result<(), DataShapeError> {
        let fallback = if range.start <= range.end { range } else { self.model.range() };
        self.apply(TimeSeriesModel::build(raw, range), fallback)
    }

    /// Build a model from a decoded query result.
    pub fn set_result_set(&mut self, rs: &ResultSet) -> Result<(), DataShapeError> {
        let fallback = if rs.start_time <= rs.end_time {
            TimeRange::new(rs.start_time, rs.end_time)
        } else {
            self.model.range()
        };
        self.apply(TimeSeriesModel::from_result_set(rs), fallback)
    }

    fn apply(
        &mut self,
        built: Result<TimeSeriesModel, DataShapeError>,
        fallback: TimeRange,
    ) -> Result<(), DataShapeError> {
        match built {
            Ok(model) => {
                self.set_model(model);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(chart = %self.id, error = %e, "Rejected chart data");
                self.set_model(TimeSeriesModel::empty(fallback));
                self.status = ChartStatus::Error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn set_loading(&mut self) {
        self.status = ChartStatus::Loading;
    }

    pub fn size(&self) -> (f32, f32) {
        (self.style.width, self.style.height)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.style = self.style.clone().with_size(width, height);
    }

    /// Toggle a series in the legend; returns whether it is now hidden.
    pub fn toggle_series(&mut self, series_id: &str) -> bool {
        self.style.toggle_hidden(series_id)
    }

    /// Local viewport, ignoring any shared one.
    pub fn local_viewport(&self) -> Viewport {
        self.viewport
    }

    /// Viewport to render: the group's when zoom is linked, else the local one.
    pub fn viewport(&self, bus: &SyncBus) -> Viewport {
        bus.viewport(self.group())
            .and_then(|shared| {
                shared
                    .time
                    .clamped_to(self.model.range())
                    .map(|time| Viewport::new(time, shared.value))
            })
            .unwrap_or(self.viewport)
    }

    /// Pixel mapping for the current viewport and size.
    pub fn scale(&self, bus: &SyncBus) -> Scale {
        let viewport = self.viewport(bus);
        let (min, max) = resolve_value_range(&self.model, &viewport, &self.style);
        Scale::new(self.style.plot_area(), viewport.time, min, max)
    }

    /// Feed one input event through the controller.
    ///
    /// A new viewport is applied locally; publishing is left to the caller.
    pub fn handle_input(&mut self, event: InputEvent, bus: &SyncBus) -> Response {
        let ctx = InteractionContext {
            scale: self.scale(bus),
            viewport: self.viewport(bus),
            bounds: self.model.range(),
        };
        let response = self.controller.handle(event, &ctx);
        if let Some(viewport) = response.viewport {
            self.viewport = viewport;
        }
        response
    }

    /// Tooltip for the group's hover time, if it falls inside the viewport.
    pub fn tooltip(&mut self, bus: &SyncBus) -> Option<TooltipContent> {
        let scale = self.scale(bus);
        let hover = bus.hover(self.group());
        if !hover.timestamp.is_some_and(|t| scale.time.contains(t)) {
            return None;
        }
        self.presenter.set_ms_per_pixel(scale.ms_per_pixel());
        self.presenter.present(&hover, &self.model)
    }

    /// Legend rows with statistics over the current viewport.
    pub fn legend(&self, bus: &SyncBus) -> Vec<LegendEntry> {
        let range = self.viewport(bus).time;
        self.model
            .series()
            .iter()
            .enumerate()
            .map(|(index, series)| LegendEntry {
                series: series.id().to_string(),
                color: self.style.color_for(series, index),
                hidden: self.style.is_hidden(series.id()),
                stats: SeriesStats::compute(series, range),
            })
            .collect()
    }

    /// Produce a frame from the latest state.
    pub fn render(&mut self, bus: &SyncBus) -> RenderedFrame {
        let viewport = self.viewport(bus);
        let base = self.cache.get_or_render(&self.model, &viewport, &self.style);

        let tooltip = self.tooltip(bus);
        let message = self.status.message();
        let overlay = Overlay {
            hover: bus.hover(self.group()).timestamp,
            selection: self.controller.selection(),
            tooltip: tooltip.as_ref(),
            status_message: message.as_deref(),
        };

        RenderedFrame {
            base,
            overlay: ChartRenderer.render_overlay(&viewport, &self.style, &overlay),
        }
    }
}
