//! Metric panel: header, chart canvas and legend.

use iced::widget::{Column, button, column, container, row, text};
use iced::{Alignment, Color, Element, Length, Theme};

use crate::formatting::format_with;
use crate::instance::{LegendEntry, RenderedFrame};
use crate::message::Message;
use crate::status::ChartStatus;
use crate::sync_bus::ChartId;
use crate::view::canvas::chart_canvas;

/// Everything the panel needs to render, borrowed from the application.
#[derive(Debug, Clone, Copy)]
pub struct MetricPanel<'a> {
    pub id: &'a ChartId,
    pub title: &'a str,
    pub status: &'a ChartStatus,
    pub frame: Option<&'a RenderedFrame>,
    pub size: (f32, f32),
    pub value_format: lindash_common::ValueFormat,
    pub decimals: u8,
}

/// Render a metric panel.
pub fn metric_view<'a>(panel: MetricPanel<'a>, legend: Vec<LegendEntry>) -> Element<'a, Message> {
    let header = render_header(&panel);
    let chart = chart_canvas(panel.id, panel.frame, panel.size);
    let legend = render_legend(&panel, legend);

    let content = column![header, chart, legend].spacing(6);

    container(content)
        .padding(10)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn render_header<'a>(panel: &MetricPanel<'a>) -> Element<'a, Message> {
    let title = text(panel.title).size(16);

    let status_color = match panel.status {
        ChartStatus::Ready => Color::from_rgb(0.2, 0.8, 0.2),
        ChartStatus::Loading => Color::from_rgb(0.6, 0.6, 0.6),
        ChartStatus::Empty => Color::from_rgb(0.9, 0.7, 0.2),
        ChartStatus::Error(_) => Color::from_rgb(0.8, 0.2, 0.2),
    };
    let status = text(panel.status.label())
        .size(12)
        .style(move |_theme: &Theme| text::Style {
            color: Some(status_color),
        });

    let mut header = row![title, status].spacing(10).align_y(Alignment::Center);

    if let ChartStatus::Error(reason) = panel.status {
        header = header.push(
            text(reason.clone())
                .size(12)
                .style(|_theme: &Theme| text::Style {
                    color: Some(Color::from_rgb(0.8, 0.2, 0.2)),
                }),
        );
    }

    header.into()
}

fn render_legend<'a>(panel: &MetricPanel<'a>, legend: Vec<LegendEntry>) -> Element<'a, Message> {
    if legend.is_empty() {
        return text("No series").size(11).into();
    }

    let fmt = |v: f64| format_with(panel.value_format, panel.decimals, v);
    let mut rows = Column::new().spacing(2);

    for entry in legend {
        let swatch_color = if entry.hidden {
            Color::from_rgb(0.4, 0.4, 0.4)
        } else {
            Color::from_rgba8(entry.color.r, entry.color.g, entry.color.b, 1.0)
        };
        let swatch = text("■").size(12).style(move |_theme: &Theme| text::Style {
            color: Some(swatch_color),
        });

        let stats = if entry.stats.count == 0 {
            "no data".to_string()
        } else {
            format!(
                "cur {}  min {}  max {}  avg {}",
                entry.stats.current.map_or("-".to_string(), fmt),
                fmt(entry.stats.min),
                fmt(entry.stats.max),
                fmt(entry.stats.avg),
            )
        };

        let label = row![swatch, text(entry.series.clone()).size(12), text(stats).size(11)]
            .spacing(8)
            .align_y(Alignment::Center);

        let toggle = button(label)
            .on_press(Message::ToggleSeries(panel.id.clone(), entry.series))
            .padding(2)
            .style(if entry.hidden {
                iced::widget::button::text
            } else {
                iced::widget::button::secondary
            });

        rows = rows.push(toggle);
    }

    rows.into()
}
