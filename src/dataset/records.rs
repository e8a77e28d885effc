use serde::{Deserialize, Serialize};

/// One row of the diabetes prediction dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatientRecord {
    pub gender: Gender,
    pub age: f64,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub smoking_history: SmokingHistory,
    pub bmi: f64,
    #[serde(rename = "HbA1c_level")]
    pub hba1c_level: f64,
    pub blood_glucose_level: f64,
    pub diabetes: u8,
}

impl PatientRecord {
    pub fn has_diabetes(&self) -> bool {
        self.diabetes != 0
    }

    /// True when every numeric column holds a finite value. CSV text can
    /// spell `NaN` or `inf` for an `f64` column and still parse.
    pub fn has_finite_numerics(&self) -> bool {
        self.age.is_finite()
            && self.bmi.is_finite()
            && self.hba1c_level.is_finite()
            && self.blood_glucose_level.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Fixed model encoding, shared by training and inference.
    pub fn code(self) -> f64 {
        match self {
            Gender::Male => 0.0,
            Gender::Female => 1.0,
            Gender::Other => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Parses the dataset's spelling of a gender value.
    pub fn from_label(label: &str) -> Option<Gender> {
        Gender::ALL.iter().find(|g| g.label() == label).copied()
    }
}

/// Smoking-history levels as spelled in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingHistory {
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "former")]
    Former,
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "ever")]
    Ever,
    #[serde(rename = "not current")]
    NotCurrent,
    #[serde(rename = "No Info")]
    NoInfo,
}

impl SmokingHistory {
    pub const ALL: [SmokingHistory; 6] = [
        SmokingHistory::Never,
        SmokingHistory::Former,
        SmokingHistory::Current,
        SmokingHistory::Ever,
        SmokingHistory::NotCurrent,
        SmokingHistory::NoInfo,
    ];

    /// Fixed model encoding, shared by training and inference.
    pub fn code(self) -> f64 {
        match self {
            SmokingHistory::Never => 0.0,
            SmokingHistory::Former => 1.0,
            SmokingHistory::Current => 2.0,
            SmokingHistory::Ever => 3.0,
            SmokingHistory::NotCurrent => 4.0,
            SmokingHistory::NoInfo => 5.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SmokingHistory::Never => "never",
            SmokingHistory::Former => "former",
            SmokingHistory::Current => "current",
            SmokingHistory::Ever => "ever",
            SmokingHistory::NotCurrent => "not current",
            SmokingHistory::NoInfo => "No Info",
        }
    }

    pub fn from_label(label: &str) -> Option<SmokingHistory> {
        SmokingHistory::ALL
            .iter()
            .find(|s| s.label() == label)
            .copied()
    }
}
