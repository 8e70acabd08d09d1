//! Gateway endpoint handlers
//!
//! Each handler is a pure function of (parsed request, transport) to a
//! status + JSON body or a `GatewayError`, independent of how the HTTP layer
//! hosting it is wired. Response shapes match what the dashboard front end
//! has always consumed.

use super::error::GatewayError;
use super::queries::{self, ElectionPeriod, Jurisdiction, RankDimension};
use super::transport::{QueryResult, QueryTransport};
use crate::config::ClickHouseConfig;
use chrono::{SecondsFormat, Utc};
use hyper::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Body of /api/query
#[derive(Debug, Default, Deserialize)]
pub struct AdHocRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Body of /api/election-metrics and /api/top-jurisdictions
#[derive(Debug, Default, Deserialize)]
pub struct ElectionRequest {
    #[serde(default)]
    pub election: Option<String>,
}

/// Body of /api/jurisdiction-map
#[derive(Debug, Default, Deserialize)]
pub struct MapRequest {
    #[serde(default)]
    pub election: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
}

/// Health/echo endpoint
pub fn hello(method: &Method) -> (StatusCode, Value) {
    let mut body = json!({
        "message": "Hello from the turnout dashboard API!",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "method": method.as_str(),
    });
    if *method == Method::POST {
        body["received"] = json!("POST request processed successfully");
    }
    (StatusCode::OK, body)
}

/// Connectivity probe: runs a trivial query and reports which configuration
/// variables are present
pub async fn test_connection(
    transport: &dyn QueryTransport,
    config: &ClickHouseConfig,
) -> (StatusCode, Value) {
    let environment = config.environment_flags();
    match transport.execute_raw(queries::connectivity_probe()).await {
        Ok(raw) => {
            // The probe runs without FORMAT JSON, so the default TSV shape is
            // expected; JSON is accepted if the server was configured for it.
            let data = serde_json::from_str::<Value>(&raw)
                .unwrap_or_else(|_| parse_tab_separated(&raw));
            (
                StatusCode::OK,
                json!({
                    "success": true,
                    "message": "ClickHouse connection successful",
                    "data": data,
                    "rawResponse": raw,
                    "environment": environment,
                }),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "success": false,
                "error": e.to_string(),
                "details": "ClickHouse connection or query failed",
                "environment": environment,
            }),
        ),
    }
}

/// Ad-hoc query pass-through
pub async fn run_query(
    req: AdHocRequest,
    transport: &dyn QueryTransport,
) -> Result<(StatusCode, Value), GatewayError> {
    let sql = req
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| GatewayError::Validation("Query is required".to_string()))?;

    let result = transport.execute(&sql).await?;
    Ok((StatusCode::OK, tabular_body(&result)))
}

/// KPI-card metrics summary
pub async fn election_metrics(
    req: ElectionRequest,
    transport: &dyn QueryTransport,
) -> Result<(StatusCode, Value), GatewayError> {
    let period = parse_election_strict(req.election.as_deref())?;
    let result = transport.execute(&queries::metrics_summary(period)).await?;

    let mut body = tabular_body(&result);
    // Shortcut for the KPI cards: the first (only) row, or an empty object
    body["row"] = result.data.first().cloned().unwrap_or_else(|| json!({}));
    Ok((StatusCode::OK, body))
}

/// Per-jurisdiction breakdown for the map view
pub async fn jurisdiction_map(
    req: MapRequest,
    transport: &dyn QueryTransport,
) -> Result<(StatusCode, Value), GatewayError> {
    let period = parse_election_strict(req.election.as_deref())?;
    let dimension = Jurisdiction::parse(req.jurisdiction.as_deref());

    let result = transport
        .execute(&queries::jurisdiction_breakdown(period, dimension))
        .await?;
    Ok((StatusCode::OK, tabular_body(&result)))
}

/// Four sequential ranked queries; a failure in any aborts the response
///
/// Unknown election labels silently fall into the Aug 2024 branch here, a
/// long-standing asymmetry with the strict endpoints (see DESIGN.md).
pub async fn top_jurisdictions(
    req: ElectionRequest,
    transport: &dyn QueryTransport,
) -> Result<(StatusCode, Value), GatewayError> {
    let period = ElectionPeriod::parse_or_default(req.election.as_deref().unwrap_or_default());

    let mut results = Map::new();
    for dimension in RankDimension::ALL {
        let result = transport
            .execute(&queries::top_ranked(period, dimension))
            .await?;
        let value = if dimension == RankDimension::Cities {
            Value::Array(result.data.iter().map(|row| ranked_entry(Some(row))).collect())
        } else {
            ranked_entry(result.data.first())
        };
        results.insert(dimension_key(dimension).to_string(), value);
    }

    Ok((StatusCode::OK, Value::Object(results)))
}

/// Turnout time series as parallel label/value arrays
pub async fn turnout_series(
    transport: &dyn QueryTransport,
) -> Result<(StatusCode, Value), GatewayError> {
    let result = transport.execute(&queries::turnout_series()).await?;

    let labels: Vec<Value> = result
        .data
        .iter()
        .map(|row| row.get("label").cloned().unwrap_or_else(|| json!("")))
        .collect();
    let data: Vec<Value> = result
        .data
        .iter()
        .map(|row| json!(as_number(row.get("pct"))))
        .collect();

    Ok((StatusCode::OK, json!({ "labels": labels, "data": data })))
}

fn parse_election_strict(label: Option<&str>) -> Result<ElectionPeriod, GatewayError> {
    ElectionPeriod::parse(label.unwrap_or_default())
        .ok_or_else(|| GatewayError::Validation("Unsupported election period".to_string()))
}

/// Common `{data, meta, stats}` envelope
fn tabular_body(result: &QueryResult) -> Value {
    let stats = if result.statistics.is_null() {
        json!({})
    } else {
        result.statistics.clone()
    };
    json!({
        "data": result.data,
        "meta": result.meta,
        "stats": stats,
    })
}

/// One ranked row with per-field defaults, never a top-level error
fn ranked_entry(row: Option<&Value>) -> Value {
    json!({
        "name": field_or(row, "name", json!("")),
        "count": field_or(row, "count", json!(0)),
        "turnout": field_or(row, "turnout", json!(0)),
    })
}

fn field_or(row: Option<&Value>, key: &str, default: Value) -> Value {
    row.and_then(|r| r.get(key))
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or(default)
}

const fn dimension_key(dimension: RankDimension) -> &'static str {
    match dimension {
        RankDimension::County => "county",
        RankDimension::Congressional => "congressional",
        RankDimension::Legislative => "legislative",
        RankDimension::Cities => "cities",
    }
}

/// Upstream may render 64-bit aggregates as strings; coerce like the
/// front end always has
fn as_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Fallback for probe responses the server renders as a two-line
/// tab-separated table (header row + one value row)
fn parse_tab_separated(raw: &str) -> Value {
    let mut lines = raw.trim().lines();
    let (Some(header), Some(values)) = (lines.next(), lines.next()) else {
        return json!({});
    };

    let mut object = Map::new();
    for (name, value) in header.split('\t').zip(values.split('\t')) {
        object.insert(name.to_string(), Value::String(value.to_string()));
    }
    Value::Object(object)
}
