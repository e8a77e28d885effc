use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::charts;
use crate::dataset::{Gender, SmokingHistory};
use crate::error::AppError;
use crate::state::AppState;
use crate::stats::correlation::{self, SCATTER_POINT_LIMIT};
use crate::stats::prevalence::{self, PrevalenceFilter};
use crate::stats::summary;

#[derive(Debug, Deserialize)]
pub struct PrevalenceQuery {
    gender: Option<String>,
    smoking_history: Option<String>,
}

fn parse_gender(raw: Option<&str>) -> Result<Option<Gender>, AppError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            Gender::from_label(s).ok_or_else(|| {
                let valid: Vec<&str> = Gender::ALL.iter().map(|g| g.label()).collect();
                AppError::InvalidInput(format!(
                    "unknown gender {:?}, expected one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
        })
        .transpose()
}

fn parse_smoking(raw: Option<&str>) -> Result<Option<SmokingHistory>, AppError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            SmokingHistory::from_label(s).ok_or_else(|| {
                let valid: Vec<&str> = SmokingHistory::ALL.iter().map(|h| h.label()).collect();
                AppError::InvalidInput(format!(
                    "unknown smoking history {:?}, expected one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
        })
        .transpose()
}

pub async fn get_prevalence(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PrevalenceQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let filter = PrevalenceFilter {
        gender: parse_gender(params.gender.as_deref())?,
        smoking_history: parse_smoking(params.smoking_history.as_deref())?,
    };
    let buckets = prevalence::prevalence_by_age(&state.dataset, filter);
    let figure = charts::prevalence_bar(&buckets, filter);

    Ok(Json(json!({
        "filters": {
            "gender": filter.gender.map(|g| g.label()),
            "smoking_history": filter.smoking_history.map(|s| s.label()),
        },
        "buckets": buckets,
        "figure": figure,
    })))
}

pub async fn get_correlation(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let matrix = correlation::correlation_matrix(&state.dataset);
    let sample = correlation::scatter_sample(
        &state.dataset,
        SCATTER_POINT_LIMIT,
        state.config.model_seed,
    );
    let heatmap = charts::correlation_heatmap(&matrix);
    let scatter = charts::scatter_matrix(&sample);

    Json(json!({
        "matrix": matrix,
        "sample_points": sample.age.len(),
        "sampled": sample.sampled,
        "heatmap": heatmap,
        "scatter_matrix": scatter,
    }))
}

pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "dataset": summary::summarize(&state.dataset),
        "model": state.model.info(),
    }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "diabetes_dashboard",
        "dataset_rows": state.dataset.records.len(),
    }))
}
