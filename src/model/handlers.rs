use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::json;
use std::sync::Arc;

use crate::charts;
use crate::error::AppError;
use crate::model::scenario::{self, SimulationRequest};
use crate::state::AppState;

pub async fn post_simulate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    // A body that fails to deserialize (unknown gender or smoking label,
    // wrong type) is a client error, not axum's plain-text rejection.
    let Json(request) = body.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    request
        .baseline
        .validate()
        .map_err(AppError::InvalidInput)?;
    if let Some(bmi) = request.new_bmi {
        scenario::validate_bmi(bmi).map_err(AppError::InvalidInput)?;
    }

    let simulation = scenario::simulate(&state.model, &request)?;
    let figure = charts::risk_gauge(&simulation);

    Ok(Json(json!({
        "simulation": simulation,
        "figure": figure,
    })))
}
