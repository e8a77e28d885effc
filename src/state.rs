use crate::config::Config;
use crate::dataset::Dataset;
use crate::model::RiskModel;

/// Shared application state built once at startup.
///
/// The dataset and model are read-only after construction, so handlers share
/// the state through an `Arc` without any locking.
pub struct AppState {
    pub config: Config,
    pub dataset: Dataset,
    pub model: RiskModel,
}
