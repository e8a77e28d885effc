mod charts;
mod config;
mod dataset;
mod error;
mod model;
mod pages;
mod state;
mod stats;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::dataset::Dataset;
use crate::model::RiskModel;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diabetes_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        "Starting diabetes dashboard on port {} with dataset at {}",
        config.port,
        config.data_path
    );

    // Load the patient dataset
    let dataset = Dataset::load(&config.data_path)?;
    tracing::info!(
        "Loaded {} patient rows ({} malformed skipped, {} age outliers dropped)",
        dataset.records.len(),
        dataset.skipped_rows,
        dataset.outliers_dropped
    );

    // Train the risk model
    let model = RiskModel::fit(&dataset, config.model_trees, config.model_seed)?;
    tracing::info!(
        "Trained {} trees in {} ms, held-out accuracy {:.3}",
        model.info().n_trees,
        model.info().training_ms,
        model.info().test_accuracy
    );

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        dataset,
        model,
    });

    // Build router
    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("Dashboard listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Dashboard pages
        .route("/", get(pages::index))
        .route("/correlation", get(pages::correlation))
        .route("/simulator", get(pages::simulator))
        .route("/export/prevalence", get(pages::export_prevalence))
        // Health check
        .route("/health", get(stats::health_check))
        // Data endpoints
        .route("/api/summary", get(stats::get_summary))
        .route("/api/prevalence", get(stats::get_prevalence))
        .route("/api/correlation", get(stats::get_correlation))
        .route("/api/simulate", post(model::post_simulate))
        .with_state(state)
}
