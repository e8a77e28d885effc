use serde::Serialize;

use crate::dataset::{Dataset, Gender, MAX_AGE, SmokingHistory};

/// Age groups used for the prevalence view. Buckets are right-open except the
/// last one, which includes its upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    UnderTwenty,
    Twenties,
    Thirties,
    Forties,
    Fifties,
    Sixties,
    SeventyPlus,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 7] = [
        AgeBucket::UnderTwenty,
        AgeBucket::Twenties,
        AgeBucket::Thirties,
        AgeBucket::Forties,
        AgeBucket::Fifties,
        AgeBucket::Sixties,
        AgeBucket::SeventyPlus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::UnderTwenty => "Under 20",
            AgeBucket::Twenties => "20s",
            AgeBucket::Thirties => "30s",
            AgeBucket::Forties => "40s",
            AgeBucket::Fifties => "50s",
            AgeBucket::Sixties => "60s",
            AgeBucket::SeventyPlus => "70 and over",
        }
    }

    /// Buckets an age, or returns `None` for ages outside `[0, MAX_AGE]`.
    pub fn for_age(age: f64) -> Option<AgeBucket> {
        if !(0.0..=MAX_AGE).contains(&age) {
            return None;
        }
        let bucket = match age {
            a if a < 20.0 => AgeBucket::UnderTwenty,
            a if a < 30.0 => AgeBucket::Twenties,
            a if a < 40.0 => AgeBucket::Thirties,
            a if a < 50.0 => AgeBucket::Forties,
            a if a < 60.0 => AgeBucket::Fifties,
            a if a < 70.0 => AgeBucket::Sixties,
            _ => AgeBucket::SeventyPlus,
        };
        Some(bucket)
    }
}

/// Diabetes prevalence within one age bucket.
#[derive(Debug, Clone, Serialize)]
pub struct PrevalenceBucket {
    pub label: &'static str,
    pub total: usize,
    pub positives: usize,
    /// Percentage of diabetic patients, `None` when the bucket is empty.
    pub rate_pct: Option<f64>,
}

/// Optional demographic restriction applied before bucketing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrevalenceFilter {
    pub gender: Option<Gender>,
    pub smoking_history: Option<SmokingHistory>,
}

impl PrevalenceFilter {
    fn matches(&self, gender: Gender, smoking_history: SmokingHistory) -> bool {
        self.gender.is_none_or(|g| g == gender)
            && self.smoking_history.is_none_or(|s| s == smoking_history)
    }
}

/// Computes diabetes prevalence per age bucket over the filtered dataset.
///
/// Every bucket appears in the output in age order even when empty, so chart
/// axes stay stable across filters.
pub fn prevalence_by_age(dataset: &Dataset, filter: PrevalenceFilter) -> Vec<PrevalenceBucket> {
    let mut totals = [0usize; AgeBucket::ALL.len()];
    let mut positives = [0usize; AgeBucket::ALL.len()];

    for record in &dataset.records {
        if !filter.matches(record.gender, record.smoking_history) {
            continue;
        }
        let Some(bucket) = AgeBucket::for_age(record.age) else {
            continue;
        };
        let i = bucket as usize;
        totals[i] += 1;
        if record.has_diabetes() {
            positives[i] += 1;
        }
    }

    AgeBucket::ALL
        .iter()
        .enumerate()
        .map(|(i, bucket)| PrevalenceBucket {
            label: bucket.label(),
            total: totals[i],
            positives: positives[i],
            rate_pct: (totals[i] > 0).then(|| positives[i] as f64 / totals[i] as f64 * 100.0),
        })
        .collect()
}
