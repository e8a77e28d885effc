use serde::Serialize;

use crate::dataset::Dataset;

/// Headline numbers for the loaded dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub skipped_rows: usize,
    pub outliers_dropped: usize,
    pub diabetes_prevalence_pct: f64,
    pub mean_age: f64,
    pub mean_bmi: f64,
    pub mean_blood_glucose: f64,
    pub mean_hba1c: f64,
}

pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    let n = dataset.records.len() as f64;
    let mean = |f: fn(&crate::dataset::PatientRecord) -> f64| {
        dataset.records.iter().map(f).sum::<f64>() / n
    };
    let positives = dataset.records.iter().filter(|r| r.has_diabetes()).count();

    DatasetSummary {
        rows: dataset.records.len(),
        skipped_rows: dataset.skipped_rows,
        outliers_dropped: dataset.outliers_dropped,
        diabetes_prevalence_pct: positives as f64 / n * 100.0,
        mean_age: mean(|r| r.age),
        mean_bmi: mean(|r| r.bmi),
        mean_blood_glucose: mean(|r| r.blood_glucose_level),
        mean_hba1c: mean(|r| r.hba1c_level),
    }
}
