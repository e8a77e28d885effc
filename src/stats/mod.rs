pub mod correlation;
pub mod handlers;
pub mod prevalence;
pub mod summary;

pub use handlers::{get_correlation, get_prevalence, get_summary, health_check};
