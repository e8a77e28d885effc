pub mod loader;
pub mod records;

pub use loader::{Dataset, MAX_AGE};
pub use records::{Gender, PatientRecord, SmokingHistory};
