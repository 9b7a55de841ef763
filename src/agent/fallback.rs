//! Deterministic answer used when the model is switched off or unconfigured.
//!
//! Produces the same `{summary, suggested_visuals, chart_specs}` shape the
//! prompt asks the model for, with Vega-Lite specs built from the sample rows.
use serde_json::{json, Value};

use crate::agent::AgentRequest;
use crate::error::AppResult;
use crate::utils::{ColumnKind, Table};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

pub fn respond(request: &AgentRequest) -> AppResult<Value> {
    let table = Table::parse(&request.sample_rows)?;
    let values = Value::Array(table.records());
    let mut visuals: Vec<String> = Vec::new();
    let mut specs: Vec<Value> = Vec::new();

    let temporal = table.first_of(ColumnKind::Temporal);
    let numeric = table.first_of(ColumnKind::Numeric);
    let categorical = table.first_of(ColumnKind::Categorical);

    if !table.is_empty() {
        if let (Some(t), Some(n)) = (temporal, numeric) {
            visuals.push(format!("Line chart of {} over {}", n, t));
            specs.push(chart_spec("line", &values, (t, "temporal"), n));
        }
        if let (Some(c), Some(n)) = (categorical, numeric) {
            visuals.push(format!("Bar chart of {} by {}", n, c));
            specs.push(chart_spec("bar", &values, (c, "nominal"), n));
        }
    }

    let schema = request.schema_description.to_lowercase();
    if specs.is_empty() && ["date", "time"].iter().any(|k| schema.contains(k)) {
        visuals.push("Line chart of value over time".to_string());
    }
    if ["location", "latitude", "longitude"].iter().any(|k| schema.contains(k)) {
        visuals.push("Map of metric by location".to_string());
    }
    if visuals.is_empty() {
        visuals = vec![
            "Bar chart of a categorical column by a numeric metric".to_string(),
            "Histogram of a numeric column".to_string(),
        ];
    }

    let kinds = table.kinds();
    let names_of = |kind: ColumnKind| {
        let names: Vec<&str> = table
            .headers
            .iter()
            .zip(&kinds)
            .filter(|(_, k)| **k == kind)
            .map(|(h, _)| h.as_str())
            .collect();
        if names.is_empty() { "none".to_string() } else { names.join(", ") }
    };
    let summary = format!(
        "Offline summary: detected {} columns and {} rows. Temporal: {}. Numeric: {}. Categorical: {}.",
        table.headers.len(),
        table.rows.len(),
        names_of(ColumnKind::Temporal),
        names_of(ColumnKind::Numeric),
        names_of(ColumnKind::Categorical),
    );

    Ok(json!({
        "summary": summary,
        "suggested_visuals": visuals,
        "chart_specs": specs,
    }))
}

fn chart_spec(mark: &str, values: &Value, x: (&str, &str), y: &str) -> Value {
    let (x_field, x_type) = x;
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "data": {"values": values},
        "mark": mark,
        "encoding": {
            "x": {"field": x_field, "type": x_type, "title": x_field},
            "y": {"field": y, "type": "quantitative", "title": y},
            "tooltip": [
                {"field": x_field, "type": x_type},
                {"field": y, "type": "quantitative"}
            ]
        },
        "height": 300
    })
}
