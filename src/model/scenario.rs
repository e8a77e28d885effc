use serde::{Deserialize, Serialize};

use crate::dataset::{Gender, SmokingHistory};
use crate::model::forest::{FeatureRow, ModelError, RiskModel};

/// Accepted input ranges, matching the dashboard sliders.
pub const AGE_RANGE: (f64, f64) = (10.0, 100.0);
pub const BMI_RANGE: (f64, f64) = (15.0, 45.0);
pub const GLUCOSE_RANGE: (f64, f64) = (70.0, 300.0);

/// Deltas below this many percentage points count as unchanged.
const NEGLIGIBLE_DELTA_PCT: f64 = 0.01;

/// A hypothetical patient as entered in the simulator form.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Scenario {
    pub age: f64,
    pub bmi: f64,
    pub blood_glucose_level: f64,
    pub gender: Gender,
    pub smoking_history: SmokingHistory,
    #[serde(default)]
    pub hypertension: bool,
    #[serde(default)]
    pub heart_disease: bool,
}

impl Scenario {
    /// Encodes the scenario in the model's training feature order.
    pub fn features(&self) -> FeatureRow {
        [
            self.age,
            self.bmi,
            self.blood_glucose_level,
            self.gender.code(),
            self.smoking_history.code(),
            if self.hypertension { 1.0 } else { 0.0 },
            if self.heart_disease { 1.0 } else { 0.0 },
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        check_range("age", self.age, AGE_RANGE)?;
        check_range("bmi", self.bmi, BMI_RANGE)?;
        check_range(
            "blood_glucose_level",
            self.blood_glucose_level,
            GLUCOSE_RANGE,
        )
    }
}

pub fn validate_bmi(value: f64) -> Result<(), String> {
    check_range("new_bmi", value, BMI_RANGE)
}

fn check_range(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<(), String> {
    if !(lo..=hi).contains(&value) {
        return Err(format!(
            "{} must be between {} and {}, got {}",
            name, lo, hi, value
        ));
    }
    Ok(())
}

/// A baseline scenario plus the habit changes to try out.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    #[serde(flatten)]
    pub baseline: Scenario,
    pub new_smoking_history: SmokingHistory,
    #[serde(default)]
    pub new_bmi: Option<f64>,
}

impl SimulationRequest {
    /// The baseline with the requested habit changes applied.
    pub fn adjusted(&self) -> Scenario {
        let mut scenario = self.baseline;
        scenario.smoking_history = self.new_smoking_history;
        if let Some(bmi) = self.new_bmi {
            scenario.bmi = bmi;
        }
        scenario
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Improved,
    Worsened,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub baseline_pct: f64,
    pub adjusted_pct: f64,
    pub delta_pct: f64,
    pub verdict: Verdict,
    pub message: String,
}

fn verdict_for(delta_pct: f64) -> Verdict {
    if delta_pct.abs() < NEGLIGIBLE_DELTA_PCT {
        Verdict::Unchanged
    } else if delta_pct < 0.0 {
        Verdict::Improved
    } else {
        Verdict::Worsened
    }
}

fn message_for(verdict: Verdict, delta_pct: f64) -> String {
    match verdict {
        Verdict::Improved => format!(
            "The change lowers the predicted diabetes risk by {:.2} percentage points.",
            delta_pct.abs()
        ),
        Verdict::Worsened => format!(
            "The change raises the predicted diabetes risk by {:.2} percentage points.",
            delta_pct
        ),
        Verdict::Unchanged => "The change barely moves the predicted diabetes risk.".to_string(),
    }
}

/// Scores the baseline and adjusted scenarios with the same model.
pub fn simulate(
    model: &RiskModel,
    request: &SimulationRequest,
) -> Result<Simulation, ModelError> {
    let baseline_pct = model.predict_proba(&request.baseline.features())? * 100.0;
    let adjusted_pct = model.predict_proba(&request.adjusted().features())? * 100.0;
    let delta_pct = adjusted_pct - baseline_pct;
    let verdict = verdict_for(delta_pct);

    Ok(Simulation {
        baseline_pct,
        adjusted_pct,
        delta_pct,
        verdict,
        message: message_for(verdict, delta_pct),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, PatientRecord};
    use crate::model::forest::feature_row;

    fn baseline() -> Scenario {
        Scenario {
            age: 45.0,
            bmi: 24.0,
            blood_glucose_level: 110.0,
            gender: Gender::Female,
            smoking_history: SmokingHistory::Current,
            hypertension: false,
            heart_disease: false,
        }
    }

    #[test]
    fn test_scenario_encoding_matches_record_encoding() {
        let scenario = Scenario {
            age: 45.0,
            bmi: 24.0,
            blood_glucose_level: 110.0,
            gender: Gender::Male,
            smoking_history: SmokingHistory::Former,
            hypertension: true,
            heart_disease: false,
        };
        let record = PatientRecord {
            gender: Gender::Male,
            age: 45.0,
            hypertension: 1,
            heart_disease: 0,
            smoking_history: SmokingHistory::Former,
            bmi: 24.0,
            hba1c_level: 5.5,
            blood_glucose_level: 110.0,
            diabetes: 0,
        };
        assert_eq!(scenario.features(), feature_row(&record));
    }

    #[test]
    fn test_adjusted_changes_only_requested_fields() {
        let request = SimulationRequest {
            baseline: baseline(),
            new_smoking_history: SmokingHistory::Never,
            new_bmi: Some(21.0),
        };
        let adjusted = request.adjusted();

        assert_eq!(adjusted.smoking_history, SmokingHistory::Never);
        assert_eq!(adjusted.bmi, 21.0);
        assert_eq!(adjusted.age, request.baseline.age);
        assert_eq!(adjusted.gender, request.baseline.gender);
        assert_eq!(
            adjusted.blood_glucose_level,
            request.baseline.blood_glucose_level
        );

        let keep_bmi = SimulationRequest {
            baseline: baseline(),
            new_smoking_history: SmokingHistory::Former,
            new_bmi: None,
        };
        assert_eq!(keep_bmi.adjusted().bmi, keep_bmi.baseline.bmi);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut scenario = baseline();
        assert!(scenario.validate().is_ok());

        scenario.age = 9.9;
        assert!(scenario.validate().unwrap_err().contains("age"));

        scenario.age = 45.0;
        scenario.bmi = 50.0;
        assert!(scenario.validate().unwrap_err().contains("bmi"));

        scenario.bmi = 24.0;
        scenario.blood_glucose_level = f64::NAN;
        assert!(
            scenario
                .validate()
                .unwrap_err()
                .contains("blood_glucose_level")
        );

        assert!(validate_bmi(14.9).is_err());
        assert!(validate_bmi(45.0).is_ok());
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(verdict_for(0.0), Verdict::Unchanged);
        assert_eq!(verdict_for(0.009), Verdict::Unchanged);
        assert_eq!(verdict_for(-0.009), Verdict::Unchanged);
        assert_eq!(verdict_for(-0.01), Verdict::Improved);
        assert_eq!(verdict_for(0.01), Verdict::Worsened);
        assert_eq!(verdict_for(5.0), Verdict::Worsened);
    }

    #[test]
    fn test_request_parses_flattened_json() {
        let request: SimulationRequest = serde_json::from_str(
            r#"{
                "age": 45.0,
                "bmi": 24.0,
                "blood_glucose_level": 110.0,
                "gender": "Female",
                "smoking_history": "current",
                "new_smoking_history": "never"
            }"#,
        )
        .unwrap();

        assert_eq!(request.baseline.smoking_history, SmokingHistory::Current);
        assert_eq!(request.new_smoking_history, SmokingHistory::Never);
        assert_eq!(request.new_bmi, None);
        assert!(!request.baseline.hypertension);
    }

    /// Rows where smoking level alone decides the label.
    fn smoking_dataset(n: usize) -> Dataset {
        let mut records = Vec::with_capacity(n);
        for i in 0..n {
            let smoking = SmokingHistory::ALL[i % SmokingHistory::ALL.len()];
            let diabetes = matches!(
                smoking,
                SmokingHistory::Current | SmokingHistory::Ever
            ) as u8;
            records.push(PatientRecord {
                gender: Gender::ALL[i % Gender::ALL.len()],
                age: 30.0 + (i % 40) as f64,
                hypertension: 0,
                heart_disease: 0,
                smoking_history: smoking,
                bmi: 22.0 + (i % 10) as f64,
                hba1c_level: 5.5,
                blood_glucose_level: 100.0 + (i % 30) as f64,
                diabetes,
            });
        }
        Dataset {
            records,
            skipped_rows: 0,
            outliers_dropped: 0,
        }
    }

    #[test]
    fn test_simulate_quitting_smoking_improves_verdict() {
        let model = RiskModel::fit(&smoking_dataset(180), 20, 42).unwrap();
        let request = SimulationRequest {
            baseline: baseline(),
            new_smoking_history: SmokingHistory::Never,
            new_bmi: None,
        };

        let simulation = simulate(&model, &request).unwrap();
        assert!(simulation.baseline_pct > 50.0);
        assert!(simulation.adjusted_pct < 50.0);
        assert_eq!(simulation.verdict, Verdict::Improved);
        assert!(simulation.message.contains("lowers"));

        let no_change = SimulationRequest {
            baseline: baseline(),
            new_smoking_history: SmokingHistory::Current,
            new_bmi: None,
        };
        let simulation = simulate(&model, &no_change).unwrap();
        assert_eq!(simulation.verdict, Verdict::Unchanged);
        assert!(simulation.message.contains("barely moves"));
    }

    #[test]
    fn test_simulate_starting_smoking_worsens_verdict() {
        let model = RiskModel::fit(&smoking_dataset(180), 20, 42).unwrap();
        let mut never_smoked = baseline();
        never_smoked.smoking_history = SmokingHistory::Never;
        let request = SimulationRequest {
            baseline: never_smoked,
            new_smoking_history: SmokingHistory::Current,
            new_bmi: None,
        };

        let simulation = simulate(&model, &request).unwrap();
        assert_eq!(simulation.verdict, Verdict::Worsened);
        assert!(simulation.delta_pct > 0.0);
        assert!(simulation.message.contains("raises"));
    }
}
