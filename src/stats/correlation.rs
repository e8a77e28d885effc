use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::dataset::{Dataset, PatientRecord};

/// Cap on scatter-matrix points sent to the browser.
pub const SCATTER_POINT_LIMIT: usize = 2000;

type Accessor = fn(&PatientRecord) -> f64;

/// Columns included in the correlation matrix, in display order.
fn features() -> [(&'static str, Accessor); 6] {
    [
        ("age", |r| r.age),
        ("bmi", |r| r.bmi),
        ("blood_glucose_level", |r| r.blood_glucose_level),
        ("hypertension", |r| f64::from(r.hypertension)),
        ("heart_disease", |r| f64::from(r.heart_disease)),
        ("diabetes", |r| f64::from(r.diabetes)),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub features: Vec<&'static str>,
    /// Row-major Pearson coefficients; `None` where a column has zero variance.
    pub matrix: Vec<Vec<Option<f64>>>,
}

/// Pearson correlation between two equal-length series.
///
/// Returns `None` for mismatched or too-short input and for constant series.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

/// Builds the full pairwise correlation matrix over the numeric columns.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let features = features();
    let columns: Vec<Vec<f64>> = features
        .iter()
        .map(|(_, accessor)| dataset.records.iter().map(accessor).collect())
        .collect();

    let matrix = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();

    CorrelationMatrix {
        features: features.iter().map(|(name, _)| *name).collect(),
        matrix,
    }
}

/// Column-oriented sample of the dataset for the scatter matrix.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterSample {
    pub age: Vec<f64>,
    pub bmi: Vec<f64>,
    pub blood_glucose_level: Vec<f64>,
    pub diabetes: Vec<u8>,
    /// True when the dataset was larger than the point limit.
    pub sampled: bool,
}

/// Draws a seeded random sample of at most `limit` rows, in dataset order.
pub fn scatter_sample(dataset: &Dataset, limit: usize, seed: u64) -> ScatterSample {
    let mut indices: Vec<usize> = (0..dataset.records.len()).collect();
    let sampled = indices.len() > limit;
    if sampled {
        indices.shuffle(&mut StdRng::seed_from_u64(seed));
        indices.truncate(limit);
        indices.sort_unstable();
    }

    let mut sample = ScatterSample {
        age: Vec::with_capacity(indices.len()),
        bmi: Vec::with_capacity(indices.len()),
        blood_glucose_level: Vec::with_capacity(indices.len()),
        diabetes: Vec::with_capacity(indices.len()),
        sampled,
    };
    for i in indices {
        let record = &dataset.records[i];
        sample.age.push(record.age);
        sample.bmi.push(record.bmi);
        sample.blood_glucose_level.push(record.blood_glucose_level);
        sample.diabetes.push(record.diabetes);
    }
    sample
}
