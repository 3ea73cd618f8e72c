//! Dashboard view: header and the list of metric panels.

use iced::widget::{Column, button, column, container, row, rule, scrollable, text};
use iced::{Alignment, Element, Length};

use crate::app::LinDash;
use crate::message::Message;
use crate::view::metric::{MetricPanel, metric_view};

/// Render the dashboard.
pub fn dashboard_view(app: &LinDash) -> Element<'_, Message> {
    let header = render_header(app);
    let charts = render_charts(app);

    let content = column![header, rule::horizontal(1), charts]
        .spacing(10)
        .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn render_header(app: &LinDash) -> Element<'_, Message> {
    let title = text("LinDash").size(24);
    let chart_count = text(format!("{} charts", app.dashboard().charts().len())).size(14);
    let group = text(format!("group: {}", app.group())).size(14);

    let linked = app.dashboard().bus().is_linked(app.group());
    let link_button = button(text(if linked { "Linked zoom" } else { "Independent zoom" }).size(14))
        .on_press(Message::ToggleLinkedZoom)
        .style(if linked {
            iced::widget::button::primary
        } else {
            iced::widget::button::secondary
        });

    row![title, chart_count, group, link_button]
        .spacing(20)
        .align_y(Alignment::Center)
        .into()
}

fn render_charts(app: &LinDash) -> Element<'_, Message> {
    let dashboard = app.dashboard();

    if dashboard.charts().is_empty() {
        return container(text("No charts mounted").size(16))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let config = dashboard.config();
    let mut panels = Column::new().spacing(10);

    for chart in dashboard.charts() {
        let style = chart.style();
        let panel = MetricPanel {
            id: chart.id(),
            title: app.title_of(chart.id()),
            status: chart.status(),
            frame: app.frame(chart.id()),
            size: (style.width, style.height),
            value_format: config.value_format,
            decimals: config.decimals,
        };
        panels = panels.push(metric_view(panel, dashboard.legend(chart.id())));
    }

    scrollable(panels)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
