pub mod forest;
pub mod handlers;
pub mod scenario;

pub use forest::{ModelError, RiskModel};
pub use handlers::post_simulate;
pub use scenario::{Simulation, Verdict};
