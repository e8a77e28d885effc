use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use thiserror::Error;

use crate::dataset::{Dataset, PatientRecord};

pub const FEATURE_COUNT: usize = 7;

/// Model inputs in training order. [`feature_row`] produces values in exactly
/// this order, for training and inference alike.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "bmi",
    "blood_glucose_level",
    "gender",
    "smoking_history",
    "hypertension",
    "heart_disease",
];

pub type FeatureRow = [f64; FEATURE_COUNT];

/// Share of rows held out to score the fitted model.
const TEST_FRACTION: f64 = 0.25;
const MIN_TRAIN_ROWS: usize = 8;

type Tree = DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("not enough rows to train on: {0}")]
    TooFewRows(usize),
    #[error("training data contains a single outcome class")]
    SingleClass,
    #[error("model must have at least one tree")]
    NoTrees,
    #[error("model training failed: {0}")]
    Training(String),
    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// Bagged ensemble of decision trees predicting the diabetes label.
///
/// Each tree is fit on a seeded bootstrap resample of the training split, and
/// the predicted probability is the fraction of trees voting positive. The
/// same seed always produces the same ensemble.
#[derive(Debug)]
pub struct RiskModel {
    trees: Vec<Tree>,
    info: ModelInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub n_trees: usize,
    pub seed: u64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_accuracy: f64,
    pub trained_at: String,
    pub training_ms: i64,
    pub features: Vec<&'static str>,
}

impl RiskModel {
    /// Trains the ensemble on the dataset with a fixed seed.
    ///
    /// Rows are shuffled once, a quarter is held out, and the held-out split
    /// is scored with the standard 0.5 vote threshold.
    pub fn fit(dataset: &Dataset, n_trees: usize, seed: u64) -> Result<RiskModel, ModelError> {
        let started = Utc::now();
        if n_trees == 0 {
            return Err(ModelError::NoTrees);
        }

        let rows: Vec<FeatureRow> = dataset.records.iter().map(feature_row).collect();
        let labels: Vec<u32> = dataset
            .records
            .iter()
            .map(|r| u32::from(r.has_diabetes()))
            .collect();

        if rows.len() < MIN_TRAIN_ROWS {
            return Err(ModelError::TooFewRows(rows.len()));
        }
        let positives = labels.iter().filter(|l| **l == 1).count();
        if positives == 0 || positives == labels.len() {
            return Err(ModelError::SingleClass);
        }

        let mut indices: Vec<usize> = (0..rows.len()).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));
        let test_len =
            ((rows.len() as f64 * TEST_FRACTION).round() as usize).clamp(1, rows.len() - 1);
        let (test_idx, train_idx) = indices.split_at(test_len);

        let train_rows: Vec<FeatureRow> = train_idx.iter().map(|&i| rows[i]).collect();
        let train_labels: Vec<u32> = train_idx.iter().map(|&i| labels[i]).collect();
        let test_rows: Vec<FeatureRow> = test_idx.iter().map(|&i| rows[i]).collect();
        let test_labels: Vec<u32> = test_idx.iter().map(|&i| labels[i]).collect();

        let trees = (0..n_trees)
            .into_par_iter()
            .map(|t| fit_tree(&train_rows, &train_labels, seed.wrapping_add(t as u64 + 1)))
            .collect::<Result<Vec<Tree>, ModelError>>()?;

        let probabilities = vote_fractions(&trees, &test_rows)?;
        let mut correct = 0;
        for (probability, label) in probabilities.iter().zip(&test_labels) {
            if u32::from(*probability >= 0.5) == *label {
                correct += 1;
            }
        }
        let test_accuracy = correct as f64 / test_labels.len() as f64;

        let finished = Utc::now();
        let info = ModelInfo {
            n_trees,
            seed,
            train_rows: train_rows.len(),
            test_rows: test_rows.len(),
            test_accuracy,
            trained_at: finished.to_rfc3339(),
            training_ms: (finished.timestamp_millis() - started.timestamp_millis()).max(0),
            features: FEATURE_NAMES.to_vec(),
        };

        Ok(RiskModel { trees, info })
    }

    /// Fraction of trees voting positive for one feature row, in `[0, 1]`.
    pub fn predict_proba(&self, features: &FeatureRow) -> Result<f64, ModelError> {
        let x = DenseMatrix::from_2d_array(&[features.as_slice()]);
        let mut votes = 0usize;
        for tree in &self.trees {
            let predicted = tree
                .predict(&x)
                .map_err(|e| ModelError::Prediction(e.to_string()))?;
            if predicted.first() == Some(&1) {
                votes += 1;
            }
        }
        Ok(votes as f64 / self.trees.len() as f64)
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

fn fit_tree(rows: &[FeatureRow], labels: &[u32], seed: u64) -> Result<Tree, ModelError> {
    let n = rows.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut boot_rows: Vec<&[f64]> = Vec::with_capacity(n);
    let mut boot_labels: Vec<u32> = Vec::with_capacity(n);
    for _ in 0..n {
        let i = rng.gen_range(0..n);
        boot_rows.push(rows[i].as_slice());
        boot_labels.push(labels[i]);
    }

    let x = DenseMatrix::from_2d_array(&boot_rows);
    DecisionTreeClassifier::fit(&x, &boot_labels, DecisionTreeClassifierParameters::default())
        .map_err(|e| ModelError::Training(e.to_string()))
}

fn vote_fractions(trees: &[Tree], rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let slices: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
    let x = DenseMatrix::from_2d_array(&slices);

    let mut votes = vec![0usize; rows.len()];
    for tree in trees {
        let predicted = tree
            .predict(&x)
            .map_err(|e| ModelError::Prediction(e.to_string()))?;
        for (count, label) in votes.iter_mut().zip(&predicted) {
            if *label == 1 {
                *count += 1;
            }
        }
    }
    Ok(votes
        .into_iter()
        .map(|v| v as f64 / trees.len() as f64)
        .collect())
}

/// Encodes a patient record into the fixed feature order of [`FEATURE_NAMES`].
pub fn feature_row(record: &PatientRecord) -> FeatureRow {
    [
        record.age,
        record.bmi,
        record.blood_glucose_level,
        record.gender.code(),
        record.smoking_history.code(),
        f64::from(record.hypertension),
        f64::from(record.heart_disease),
    ]
}
