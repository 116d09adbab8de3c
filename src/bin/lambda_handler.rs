//! AWS Lambda handler for lease appraisals
//!
//! Accepts lease assumptions as JSON and returns the timeline, NPV, IRR and
//! valuations. Works for direct invocation and for Lambda Function URLs,
//! where the request arrives as a JSON string in `body`.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use lease_appraisal::{AppraisalConfig, AppraisalSession, LeaseAssumptions, Timeline};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Input for one appraisal
#[derive(Debug, Deserialize)]
pub struct AppraisalRequest {
    /// Lease assumptions (built-in defaults when omitted)
    #[serde(default)]
    pub assumptions: Option<LeaseAssumptions>,

    /// Annual discount rate (default: DISCOUNT_RATE or 8%)
    #[serde(default)]
    pub discount_rate: Option<f64>,

    /// Purchaser's costs as a fraction (default: PURCHASE_COSTS or 6.8%)
    #[serde(default)]
    pub purchase_costs: Option<f64>,

    /// Exit price (overrides `assumptions.exit_price`); derived from the
    /// relet rent when neither is set
    #[serde(default)]
    pub exit_price: Option<f64>,

    /// Leave the timeline out of the response
    #[serde(default)]
    pub summary_only: bool,
}

/// Output from the appraisal
#[derive(Debug, Serialize)]
pub struct AppraisalResponse {
    pub npv: f64,
    pub irr_pct: Option<f64>,
    pub initial_yield_value: Option<f64>,
    pub dcf_value: Option<f64>,
    pub exit_price: f64,
    pub discount_rate: f64,
    pub net_cashflow: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
    pub warnings: Vec<String>,
    pub execution_time_ms: u64,
}

fn url_response(status: u16, body: &Value) -> Value {
    json!({
        "statusCode": status,
        "headers": {
            "Content-Type": "application/json",
            "Access-Control-Allow-Origin": "*",
        },
        "body": body.to_string(),
    })
}

fn appraise_request(request: AppraisalRequest) -> Result<AppraisalResponse, Error> {
    let start = Instant::now();

    let mut config = AppraisalConfig::from_env();
    if let Some(rate) = request.discount_rate {
        config.discount_rate = rate;
    }
    if let Some(costs) = request.purchase_costs {
        config.purchase_costs = costs;
    }

    let assumptions = request.assumptions.unwrap_or_else(LeaseAssumptions::default_pricing);

    let mut session = AppraisalSession::new();
    let appraisal = session.update(&assumptions, request.exit_price, &config)?;

    info!(
        "Appraisal complete: NPV {:.2}, IRR {} in {:?}",
        appraisal.npv,
        appraisal.irr_display(),
        start.elapsed()
    );

    Ok(AppraisalResponse {
        npv: appraisal.npv,
        irr_pct: appraisal.irr.map(|r| r * 100.0),
        initial_yield_value: appraisal.initial_yield_value,
        dcf_value: appraisal.dcf_value,
        exit_price: appraisal.assumptions.exit_price.unwrap_or(0.0),
        discount_rate: appraisal.discount_rate,
        net_cashflow: appraisal.summary.net_cashflow,
        timeline: (!request.summary_only).then_some(appraisal.timeline),
        warnings: appraisal.warnings,
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let payload = event.payload;

    // Function URL requests wrap the JSON body in a string
    let (raw, via_url) = match payload.get("body") {
        Some(Value::String(body)) => (serde_json::from_str::<Value>(body)?, true),
        Some(Value::Null) => (json!({}), true),
        _ => (payload, false),
    };

    let result = serde_json::from_value::<AppraisalRequest>(raw)
        .map_err(Error::from)
        .and_then(appraise_request);

    match (result, via_url) {
        (Ok(response), false) => Ok(serde_json::to_value(response)?),
        (Ok(response), true) => Ok(url_response(200, &serde_json::to_value(response)?)),
        (Err(e), true) => {
            error!("Appraisal failed: {}", e);
            Ok(url_response(400, &json!({ "error": e.to_string() })))
        }
        (Err(e), false) => Err(e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
