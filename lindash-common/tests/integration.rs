//! Integration tests for lindash-common library.

use lindash_common::{
    DashboardConfig, Format, ResultSeries, ResultSet, decode, decode_result_sets, encode,
    parse_config,
};

fn broker_response() -> ResultSet {
    ResultSet::new("lindb.broker.query", 1_700_000_000_000, 1_700_000_030_000)
        .with_interval(10_000)
        .with_series(
            ResultSeries::new()
                .with_tag("node", "10.0.0.1:9000")
                .with_field(
                    "count",
                    [
                        (1_700_000_000_000, Some(3.0)),
                        (1_700_000_010_000, Some(5.0)),
                        (1_700_000_030_000, Some(4.0)),
                    ],
                ),
        )
        .with_series(
            ResultSeries::new()
                .with_tag("node", "10.0.0.2:9000")
                .with_field("count", [(1_700_000_020_000, None)]),
        )
}

#[test]
fn test_result_set_through_both_formats() {
    let rs = broker_response();

    let json_bytes = encode(&rs, Format::Json).expect("JSON encode failed");
    let cbor_bytes = encode(&rs, Format::Cbor).expect("CBOR encode failed");
    assert!(cbor_bytes.len() < json_bytes.len());

    let from_json: ResultSet = decode(&json_bytes, Format::Json).expect("JSON decode failed");
    let from_cbor: ResultSet = decode(&cbor_bytes, Format::Cbor).expect("CBOR decode failed");

    assert_eq!(from_json, from_cbor);
    assert_eq!(from_json.line_count(), 2);
    assert_eq!(
        from_json.series[0].line_key(&from_json.metric_name, "count"),
        "lindb.broker.query.count{node=10.0.0.1:9000}"
    );
    assert_eq!(from_json.slots().count(), 4);
}

#[test]
fn test_decode_broker_array_payload() {
    let payload = br#"[
        {"metricName": "a", "startTime": 0, "endTime": 10, "series": []},
        {"metricName": "b", "startTime": 0, "endTime": 10, "interval": 5,
         "series": [{"fields": {"f": {"5": 1.0}}}]}
    ]"#;

    let sets = decode_result_sets(payload).expect("decode failed");

    assert_eq!(sets.len(), 2);
    assert_eq!(sets[1].series[0].fields["f"][&5], Some(1.0));
}

#[test]
fn test_config_from_json5_file_contents() {
    let config: DashboardConfig = parse_config(
        r#"
        // dashboard for the storage cluster
        {
            chart: { zoomMinPixels: 8, valueFormat: "bytes", decimals: 1 },
            groups: [{ id: "storage", linkedZoom: true }],
            demo: { charts: 6, refreshSecs: 2 },
        }
        "#,
    )
    .expect("parse failed");

    assert_eq!(config.chart.zoom_min_pixels, 8.0);
    assert_eq!(config.chart.decimals, 1);
    assert_eq!(config.groups.len(), 1);
    assert_eq!(config.demo.charts, 6);
    assert_eq!(config.demo.refresh_secs, 2);
    assert_eq!(config.demo.points, 3_600);
    assert!(config.chart.validate().is_ok());
}
