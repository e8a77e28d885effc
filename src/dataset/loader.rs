use std::path::Path;

use thiserror::Error;

use super::records::PatientRecord;

/// Ages above this are treated as data-entry errors and dropped.
pub const MAX_AGE: f64 = 120.0;

const REQUIRED_COLUMNS: [&str; 9] = [
    "gender",
    "age",
    "hypertension",
    "heart_disease",
    "smoking_history",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
    "diabetes",
];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("dataset file not found: {0}; place the CSV next to the binary or set DATA_PATH")]
    NotFound(String),
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("dataset is missing required columns: {0}")]
    MissingColumns(String),
    #[error("dataset {0} contains no usable rows")]
    Empty(String),
}

/// The loaded patient dataset plus counts of what was discarded on the way in.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<PatientRecord>,
    pub skipped_rows: usize,
    pub outliers_dropped: usize,
}

impl Dataset {
    /// Reads and validates the patient CSV.
    ///
    /// Malformed rows are skipped and counted rather than failing the whole
    /// load; a parsed row with a non-finite numeric value counts as
    /// malformed too. Rows with an age above [`MAX_AGE`] are dropped as
    /// outliers.
    pub fn load(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
        let path = path.as_ref();
        let path_display = path.display().to_string();

        if !path.exists() {
            return Err(LoadError::NotFound(path_display));
        }

        let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Read {
            path: path_display.clone(),
            source,
        })?;

        {
            let headers = reader.headers().map_err(|source| LoadError::Read {
                path: path_display.clone(),
                source,
            })?;
            let missing: Vec<&str> = REQUIRED_COLUMNS
                .iter()
                .filter(|col| !headers.iter().any(|h| h == **col))
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(LoadError::MissingColumns(missing.join(", ")));
            }
        }

        let mut records = Vec::new();
        let mut skipped_rows = 0;
        let mut outliers_dropped = 0;

        for row in reader.deserialize::<PatientRecord>() {
            match row {
                Ok(record) if !record.has_finite_numerics() => skipped_rows += 1,
                Ok(record) if record.age > MAX_AGE => outliers_dropped += 1,
                Ok(record) => records.push(record),
                Err(_) => skipped_rows += 1,
            }
        }

        if skipped_rows > 0 {
            tracing::warn!("skipped {} malformed rows in {}", skipped_rows, path_display);
        }
        if outliers_dropped > 0 {
            tracing::warn!(
                "dropped {} rows with age above {} in {}",
                outliers_dropped,
                MAX_AGE,
                path_display
            );
        }

        if records.is_empty() {
            return Err(LoadError::Empty(path_display));
        }

        Ok(Dataset {
            records,
            skipped_rows,
            outliers_dropped,
        })
    }
}
