use trends_checker::api::{parse_explore, parse_multiline, parse_related, strip_json_prefix};
use trends_checker::models::Rise;

#[test]
fn strips_anti_xssi_prefix() {
    assert_eq!(strip_json_prefix(")]}'\n{\"a\":1}"), "{\"a\":1}");
    assert_eq!(strip_json_prefix(")]}',\n{\"a\":1}"), "{\"a\":1}");
    assert_eq!(strip_json_prefix("{\"a\":1}"), "{\"a\":1}");
    // nothing JSON-like: returned unchanged so the parse error points at the body
    assert_eq!(strip_json_prefix("oops"), "oops");
}

#[test]
fn parse_explore_collects_tokens() {
    let sample = r#")]}'
    {
      "widgets": [
        {
          "id": "TIMESERIES",
          "token": "APP6_UEAAAAAZ",
          "request": {"time": "2024-01-01 2024-12-31", "resolution": "WEEK"}
        },
        {
          "id": "GEO_MAP",
          "token": "ignored",
          "request": {}
        },
        {
          "id": "RELATED_QUERIES",
          "token": "rq-token-1",
          "request": {"restriction": {}}
        },
        {
          "id": "RELATED_QUERIES",
          "token": "rq-token-2",
          "request": {"restriction": {}}
        }
      ]
    }
    "#;

    let session = parse_explore(sample).unwrap();
    assert_eq!(session.timeseries.token, "APP6_UEAAAAAZ");
    // the request body must be echoed back to the widgetdata endpoint verbatim
    assert_eq!(
        session.timeseries.request,
        serde_json::json!({"time": "2024-01-01 2024-12-31", "resolution": "WEEK"})
    );
    assert_eq!(session.related.len(), 2);
    assert_eq!(session.related[0].token, "rq-token-1");
    assert_eq!(session.related[1].token, "rq-token-2");
}

#[test]
fn parse_explore_without_timeseries_is_an_error() {
    let sample = r#"{"widgets": [{"id": "GEO_MAP", "token": "t", "request": {}}]}"#;
    assert!(parse_explore(sample).is_err());
}

#[test]
fn parse_multiline_reads_timeline_buckets() {
    let sample = r#")]}',
    {
      "default": {
        "timelineData": [
          {"time": "1714867200", "formattedTime": "May 5 – 11, 2024", "value": [63, 8]},
          {"time": "1715472000", "formattedTime": "May 12 – 18, 2024", "value": [70, 12], "isPartial": true}
        ]
      }
    }
    "#;

    let points = parse_multiline(sample).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].value, vec![63, 8]);
    assert!(!points[0].is_partial);
    assert!(points[1].is_partial);
    assert_eq!(points[1].formatted_time, "May 12 – 18, 2024");
}

#[test]
fn parse_multiline_empty_timeline_is_ok() {
    let sample = r#"{"default": {"timelineData": []}}"#;
    assert!(parse_multiline(sample).unwrap().is_empty());
}

#[test]
fn parse_related_keeps_rising_list_only() {
    let sample = r#")]}',
    {
      "default": {
        "rankedList": [
          {"rankedKeyword": [{"query": "top query", "value": 100, "formattedValue": "100"}]},
          {"rankedKeyword": [
            {"query": "ai dubbing app", "value": 48900, "formattedValue": "Breakout"},
            {"query": "live translate", "value": 250, "formattedValue": "+250%"}
          ]}
        ]
      }
    }
    "#;

    let rising = parse_related(sample).unwrap();
    assert_eq!(rising.len(), 2);
    assert_eq!(rising[0].query, "ai dubbing app");
    assert_eq!(rising[0].rise, Rise::Breakout);
    assert_eq!(rising[1].rise, Rise::Percent(250));
}

#[test]
fn parse_related_without_rising_list_is_empty() {
    let sample = r#"{"default": {"rankedList": [{"rankedKeyword": []}]}}"#;
    assert!(parse_related(sample).unwrap().is_empty());
}

#[test]
fn garbage_bodies_surface_deserialize_errors() {
    assert!(parse_multiline("<html>rate limited</html>").is_err());
    assert!(parse_related(")]}'").is_err());
}
