use axum::extract::State;
use axum::response::Html;
use std::sync::Arc;

use crate::charts;
use crate::state::AppState;
use crate::stats::prevalence::{self, PrevalenceFilter};

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

pub async fn correlation() -> Html<&'static str> {
    Html(include_str!("../assets/correlation.html"))
}

pub async fn simulator() -> Html<&'static str> {
    Html(include_str!("../assets/simulator.html"))
}

/// Unfiltered prevalence chart as a self-contained page for download.
pub async fn export_prevalence(State(state): State<Arc<AppState>>) -> Html<String> {
    let buckets = prevalence::prevalence_by_age(&state.dataset, PrevalenceFilter::default());
    let figure = charts::prevalence_bar(&buckets, PrevalenceFilter::default());
    Html(charts::standalone_html(
        "Diabetes prevalence by age group",
        &figure,
    ))
}
