//! LinDash Iced application.

use std::collections::BTreeMap;
use std::time::Duration;

use iced::{Element, Subscription, Task, Theme};

use lindash_common::{DashboardConfig, GroupConfig};

use crate::dashboard::Dashboard;
use crate::demo::DemoSimulator;
use crate::instance::RenderedFrame;
use crate::message::Message;
use crate::subscription::refresh_subscription;
use crate::sync_bus::ChartId;
use crate::view::canvas::CHART_HEIGHT;
use crate::view::dashboard::dashboard_view;

/// Group used when the configuration doesn't name one.
pub const DEFAULT_GROUP: &str = "default";

/// Initial canvas width before the first layout.
const INITIAL_WIDTH: f32 = 800.0;

/// Startup options resolved from the command line and config file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config: DashboardConfig,
    /// Force shared zoom on the dashboard group.
    pub linked: bool,
}

/// The LinDash application.
pub struct LinDash {
    dashboard: Dashboard,
    /// Latest frame of every chart.
    frames: BTreeMap<ChartId, RenderedFrame>,
    /// Metric shown by each chart, in mount order.
    metrics: Vec<(ChartId, String)>,
    simulator: DemoSimulator,
    group: String,
    refresh: Duration,
}

impl LinDash {
    /// Build the application and mount the demo charts.
    pub fn new(settings: Settings) -> Self {
        let config = settings.config;
        let group = config
            .groups
            .first()
            .map(|g| g.id.clone())
            .unwrap_or_else(|| DEFAULT_GROUP.to_string());

        let mut groups = config.groups.clone();
        if settings.linked {
            match groups.iter_mut().find(|g| g.id == group) {
                Some(g) => g.linked_zoom = true,
                None => groups.push(GroupConfig {
                    id: group.clone(),
                    linked_zoom: true,
                }),
            }
        }

        let mut dashboard = Dashboard::new(config.chart.clone(), &groups);
        let metrics = (0..config.demo.charts)
            .map(|index| {
                let id = dashboard.on_mount(&group, (INITIAL_WIDTH, CHART_HEIGHT));
                (id, DemoSimulator::metric_name(index).to_string())
            })
            .collect();

        tracing::info!(
            charts = config.demo.charts,
            group = %group,
            linked = dashboard.bus().is_linked(&group),
            "Dashboard ready"
        );

        let mut app = Self {
            dashboard,
            frames: BTreeMap::new(),
            metrics,
            refresh: Duration::from_secs(config.demo.refresh_secs),
            simulator: DemoSimulator::new(config.demo),
            group,
        };
        app.refresh_data();
        app.flush();
        app
    }

    /// Get the window title.
    pub fn title(&self) -> String {
        format!("LinDash - {} charts", self.metrics.len())
    }

    /// Handle incoming messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Input(id, event, (width, height)) => {
                self.resize(&id, width, height);
                self.dashboard.handle_input(&id, event);
            }

            Message::Resized(id, width, height) => {
                self.resize(&id, width, height);
            }

            Message::ToggleSeries(id, series) => {
                let hidden = self.dashboard.toggle_series(&id, &series);
                tracing::debug!(chart = %id, series = %series, hidden, "Toggled series");
            }

            Message::ToggleLinkedZoom => {
                let linked = !self.dashboard.bus().is_linked(&self.group);
                tracing::info!(group = %self.group, linked, "Linked zoom changed");
                self.dashboard.set_linked_zoom(&self.group, linked);
            }

            Message::Refresh => {
                self.refresh_data();
            }
        }

        self.flush();
        Task::none()
    }

    /// Periodic refresh of demo data.
    pub fn subscription(&self) -> Subscription<Message> {
        refresh_subscription(self.refresh)
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        dashboard_view(self)
    }

    /// Get the application theme.
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn frame(&self, id: &ChartId) -> Option<&RenderedFrame> {
        self.frames.get(id)
    }

    /// Metric name shown by a chart.
    pub fn title_of(&self, id: &ChartId) -> &str {
        self.metrics
            .iter()
            .find(|(chart, _)| chart == id)
            .map(|(_, metric)| metric.as_str())
            .unwrap_or_default()
    }

    /// Apply a layout size before anything is measured against it.
    fn resize(&mut self, id: &ChartId, width: f32, height: f32) {
        if width > 0.0 && self.dashboard.resize(id, width, height) {
            tracing::debug!(chart = %id, width, height, "Chart resized");
        }
    }

    /// Regenerate every chart's data.
    fn refresh_data(&mut self) {
        let now = now_ms();
        for (index, (id, _)) in self.metrics.iter().enumerate() {
            let rs = self.simulator.query(index, now);
            if let Err(e) = self.dashboard.set_result_set(id, &rs) {
                tracing::warn!(chart = %id, error = %e, "Failed to load demo data");
            }
        }
    }

    /// Render dirty charts and keep their frames for the view.
    fn flush(&mut self) {
        for (id, frame) in self.dashboard.flush() {
            self.frames.insert(id, frame);
        }
    }
}

/// Get current time in milliseconds.
fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InputEvent;
    use lindash_common::DemoConfig;

    fn settings(charts: usize, linked: bool) -> Settings {
        let mut config = DashboardConfig::default();
        config.demo = DemoConfig {
            charts,
            points: 300,
            ..DemoConfig::default()
        };
        Settings { config, linked }
    }

    #[test]
    fn test_boot_mounts_and_renders_charts() {
        let app = LinDash::new(settings(3, false));

        assert_eq!(app.dashboard().charts().len(), 3);
        assert_eq!(app.frames.len(), 3);
        assert_eq!(app.title(), "LinDash - 3 charts");
        let first = app.dashboard().charts()[0].id().clone();
        assert_eq!(app.title_of(&first), "system.cpu");
    }

    #[test]
    fn test_linked_flag_and_toggle() {
        let mut app = LinDash::new(settings(2, true));
        assert!(app.dashboard().bus().is_linked(DEFAULT_GROUP));

        let _ = app.update(Message::ToggleLinkedZoom);
        assert!(!app.dashboard().bus().is_linked(DEFAULT_GROUP));
    }

    #[test]
    fn test_input_updates_frames() {
        let mut app = LinDash::new(settings(2, false));
        let a = app.dashboard().charts()[0].id().clone();
        let before = app.frame(&a).map(|f| f.overlay.clone());

        let _ = app.update(Message::Input(
            a.clone(),
            InputEvent::PointerEntered { x: 300.0, y: 80.0 },
            (INITIAL_WIDTH, CHART_HEIGHT),
        ));

        assert!(app.dashboard().bus().hover(DEFAULT_GROUP).timestamp.is_some());
        assert_ne!(app.frame(&a).map(|f| f.overlay.clone()), before);
    }

    #[test]
    fn test_input_on_resized_canvas_is_kept() {
        let mut app = LinDash::new(settings(2, false));
        let a = app.dashboard().charts()[0].id().clone();

        let _ = app.update(Message::Input(
            a.clone(),
            InputEvent::PointerEntered { x: 300.0, y: 80.0 },
            (400.0, CHART_HEIGHT),
        ));

        let chart = app.dashboard().chart(&a).unwrap();
        assert_eq!(chart.size(), (400.0, CHART_HEIGHT));
        let hover = app.dashboard().bus().hover(DEFAULT_GROUP);
        assert_eq!(hover.origin, Some(a.clone()));
        let expected = chart.scale(app.dashboard().bus()).x_to_time(300.0);
        assert_eq!(hover.timestamp, Some(expected));
    }

    #[test]
    fn test_same_size_is_not_a_resize() {
        let mut app = LinDash::new(settings(1, false));
        let a = app.dashboard().charts()[0].id().clone();

        assert!(!app.dashboard.resize(&a, INITIAL_WIDTH, CHART_HEIGHT));
        assert!(app.dashboard.resize(&a, 500.0, CHART_HEIGHT));
    }
}
