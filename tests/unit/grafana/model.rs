use super::*;

#[test]
fn parses_nested_rows_and_ignores_unknown_fields() {
    let src = r#"{
        "title": "Service",
        "uid": "abc",
        "schemaVersion": 39,
        "templating": { "list": [ { "name": "Org", "type": "query" } ] },
        "panels": [
            {
                "type": "row",
                "title": "API",
                "collapsed": true,
                "gridPos": { "h": 1, "w": 24, "x": 0, "y": 0 },
                "panels": [
                    {
                        "type": "timeseries",
                        "title": "Errors",
                        "targets": [
                            { "expr": "sum(rate(errors_total[5m]))", "refId": "A" },
                            { "refId": "B", "datasource": "loki" }
                        ]
                    }
                ]
            },
            { "type": "text", "title": "Notes", "options": { "content": "hi" } }
        ]
    }"#;
    let d = GrafanaDashboard::from_json(src).unwrap();
    assert_eq!(d.title.as_deref(), Some("Service"));
    assert_eq!(d.templating.list[0].name, "Org");
    assert_eq!(d.panels.len(), 2);

    let row = &d.panels[0];
    assert!(row.is_row());
    assert!(row.collapsed);
    assert_eq!(row.panels[0].targets.len(), 2);
    assert_eq!(
        row.panels[0].targets[0].expr.as_deref(),
        Some("sum(rate(errors_total[5m]))")
    );
    assert_eq!(row.panels[0].targets[1].expr, None);
    assert!(d.panels[1].is_text());
}

#[test]
fn missing_fields_default() {
    let d = GrafanaDashboard::from_json("{}").unwrap();
    assert!(d.title.is_none());
    assert!(d.templating.list.is_empty());
    assert!(d.panels.is_empty());

    let d = GrafanaDashboard::from_json(r#"{"panels":[{}]}"#).unwrap();
    assert_eq!(d.panels[0].kind, "");
    assert!(d.panels[0].targets.is_empty());
    assert!(!d.panels[0].collapsed);
}

#[test]
fn malformed_json_is_an_input_error() {
    let err = GrafanaDashboard::from_json("{ not json").unwrap_err();
    assert!(matches!(err, GrafdogError::Input(_)));
    assert!(err.to_string().contains("parse Grafana dashboard JSON"));
}

#[test]
fn reads_from_reader() {
    let bytes = br#"{"title":"t"}"#;
    let d = GrafanaDashboard::from_reader(&bytes[..]).unwrap();
    assert_eq!(d.title.as_deref(), Some("t"));
}

#[test]
fn null_fields_default() {
    let src = r#"{
        "title": null,
        "templating": { "list": [ { "type": "interval" }, { "name": null }, { "name": "env" } ] },
        "panels": [
            { "type": null, "title": "Blank", "targets": null, "panels": null, "collapsed": null },
            { "type": "graph", "targets": [ { "expr": null } ] }
        ]
    }"#;
    let d = GrafanaDashboard::from_json(src).unwrap();
    assert!(d.title.is_none());
    let names: Vec<&str> = d.templating.list.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["", "", "env"]);
    assert_eq!(d.panels[0].kind, "");
    assert!(d.panels[0].targets.is_empty());
    assert!(d.panels[0].panels.is_empty());
    assert!(!d.panels[0].collapsed);
    assert_eq!(d.panels[1].targets[0].expr, None);

    let d = GrafanaDashboard::from_json(r#"{"templating":null,"panels":null}"#).unwrap();
    assert!(d.templating.list.is_empty());
    assert!(d.panels.is_empty());

    let d = GrafanaDashboard::from_json(r#"{"templating":{"list":null}}"#).unwrap();
    assert!(d.templating.list.is_empty());
}
