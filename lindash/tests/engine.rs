//! End-to-end tests of the chart engine: broker results in, frames out.

use lindash::chart::Viewport;
use lindash::{ChartId, ChartStatus, Dashboard, InputEvent, Key, TimeRange};
use lindash_common::{ChartConfig, Format, GroupConfig, ResultSet, decode_result_sets, encode};

const SIZE: (f32, f32) = (400.0, 200.0);

const BROKER_RESPONSE: &str = r#"[
    {
        "metricName": "system.cpu",
        "groupBy": ["host"],
        "fields": ["usage"],
        "startTime": 0,
        "endTime": 4000,
        "interval": 1000,
        "series": [
            {"tags": {"host": "a"}, "fields": {"usage": {"0": 10, "1000": 20, "2000": 30, "3000": 20, "4000": 10}}},
            {"tags": {"host": "b"}, "fields": {"usage": {"0": 5, "1000": 15, "3000": 35, "4000": 25}}}
        ]
    },
    {
        "metricName": "system.memory",
        "fields": ["used"],
        "startTime": 0,
        "endTime": 4000,
        "interval": 1000,
        "series": [
            {"fields": {"used": {"0": 60, "1000": 61, "2000": 62, "3000": 63, "4000": 64}}}
        ]
    }
]"#;

fn linked_dashboard() -> (Dashboard, ChartId, ChartId) {
    let groups = [GroupConfig {
        id: "hosts".to_string(),
        linked_zoom: true,
    }];
    let mut dash = Dashboard::new(ChartConfig::default(), &groups);
    let cpu = dash.on_mount("hosts", SIZE);
    let memory = dash.on_mount("hosts", SIZE);

    let sets = decode_result_sets(BROKER_RESPONSE.as_bytes()).unwrap();
    assert_eq!(sets.len(), 2);
    dash.set_result_set(&cpu, &sets[0]).unwrap();
    dash.set_result_set(&memory, &sets[1]).unwrap();
    dash.flush();

    (dash, cpu, memory)
}

fn x_of(dash: &Dashboard, id: &ChartId, t: i64) -> f32 {
    dash.chart(id).unwrap().scale(dash.bus()).time_to_x(t)
}

#[test]
fn test_result_sets_become_series() {
    let (dash, cpu, memory) = linked_dashboard();

    let cpu_model = dash.chart(&cpu).unwrap().model();
    let ids: Vec<_> = cpu_model.series().iter().map(|s| s.id().to_string()).collect();
    assert_eq!(
        ids,
        vec!["system.cpu.usage{host=a}", "system.cpu.usage{host=b}"]
    );
    assert_eq!(cpu_model.range(), TimeRange::new(0, 4000));
    assert_eq!(dash.chart(&cpu).unwrap().status(), &ChartStatus::Ready);

    let memory_model = dash.chart(&memory).unwrap().model();
    assert_eq!(memory_model.series()[0].id(), "system.memory.used");
}

#[test]
fn test_hover_reaches_every_chart_of_the_group() {
    let (mut dash, cpu, memory) = linked_dashboard();

    let x = x_of(&dash, &cpu, 2000);
    assert!(dash.handle_input(&cpu, InputEvent::PointerEntered { x, y: 80.0 }));

    let cpu_tip = dash.tooltip(&cpu).unwrap();
    assert_eq!(cpu_tip.row("system.cpu.usage{host=a}").unwrap().display(), "30");
    // host=b has no value in the 2000 slot
    assert_eq!(cpu_tip.row("system.cpu.usage{host=b}").unwrap().display(), "no data");

    let memory_tip = dash.tooltip(&memory).unwrap();
    assert_eq!(memory_tip.row("system.memory.used").unwrap().display(), "62");

    let frames = dash.flush();
    assert_eq!(frames.len(), 2);

    assert!(dash.handle_input(&cpu, InputEvent::PointerLeft));
    assert!(dash.tooltip(&memory).is_none());
}

#[test]
fn test_box_zoom_is_shared_and_reset() {
    let (mut dash, cpu, memory) = linked_dashboard();

    let from = x_of(&dash, &cpu, 1000);
    let to = x_of(&dash, &cpu, 3000);
    dash.handle_input(
        &cpu,
        InputEvent::PointerPressed {
            x: from,
            y: 60.0,
            modifier: true,
        },
    );
    dash.handle_input(&cpu, InputEvent::PointerMoved { x: to, y: 120.0 });
    dash.handle_input(&cpu, InputEvent::PointerReleased { x: to, y: 120.0 });

    let zoomed = dash.chart(&memory).unwrap().viewport(dash.bus()).time;
    assert!((zoomed.start - 1000).abs() <= 20, "start {}", zoomed.start);
    assert!((zoomed.end - 3000).abs() <= 20, "end {}", zoomed.end);
    assert_eq!(dash.chart(&cpu).unwrap().viewport(dash.bus()).time, zoomed);

    dash.handle_input(&memory, InputEvent::Key(Key::Reset));
    let full = Viewport::full(TimeRange::new(0, 4000)).time;
    assert_eq!(dash.chart(&cpu).unwrap().viewport(dash.bus()).time, full);
}

#[test]
fn test_malformed_result_set_shows_reason() {
    let (mut dash, cpu, _) = linked_dashboard();

    let bad = ResultSet::new("system.cpu", 5000, 1000);
    assert!(dash.set_result_set(&cpu, &bad).is_err());

    let chart = dash.chart(&cpu).unwrap();
    assert!(matches!(chart.status(), ChartStatus::Error(_)));
    assert!(chart.model().is_empty());

    let frames = dash.flush();
    let (_, frame) = frames.iter().find(|(id, _)| *id == cpu).unwrap();
    assert!(frame.texts().iter().any(|t| t.starts_with("No data:")));
}

#[test]
fn test_unmount_leaves_group_working() {
    let (mut dash, cpu, memory) = linked_dashboard();

    assert!(dash.on_unmount(&cpu));
    assert!(!dash.on_unmount(&cpu));
    assert_eq!(dash.bus().members("hosts"), vec![memory.clone()]);

    let x = x_of(&dash, &memory, 1000);
    dash.handle_input(&memory, InputEvent::PointerMoved { x, y: 80.0 });
    let frames = dash.flush();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, memory);
}

#[test]
fn test_cbor_payload_loads_like_json() {
    let sets = decode_result_sets(BROKER_RESPONSE.as_bytes()).unwrap();
    let cbor = encode(&sets, Format::Cbor).unwrap();
    let decoded = decode_result_sets(&cbor).unwrap();
    assert_eq!(decoded, sets);

    let mut dash = Dashboard::new(ChartConfig::default(), &[]);
    let id = dash.on_mount("solo", SIZE);
    dash.set_result_set(&id, &decoded[0]).unwrap();
    assert_eq!(dash.chart(&id).unwrap().model().series().len(), 2);
}
