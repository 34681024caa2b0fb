//! Common domain type definitions
//!
//! Enum types shared by subject records, cohort records and reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sex of a cohort subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Female
    Female,
    /// Male
    Male,
}

impl Sex {
    /// Parse a textual sex label (`female`/`male`, `f`/`m`)
    #[must_use]
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" | "1" => Some(Self::Female),
            "male" | "m" | "2" => Some(Self::Male),
            _ => None,
        }
    }

    /// Map the raw export's gender code (1 = female, 2 = male)
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Female),
            2 => Some(Self::Male),
            _ => None,
        }
    }

    /// Lowercase label used in datasets and reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal level shared by cholesterol and glucose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryLevel {
    /// 1: normal
    Normal = 1,
    /// 2: above normal
    AboveNormal = 2,
    /// 3: well above normal
    WellAboveNormal = 3,
}

impl CategoryLevel {
    /// Convert a numeric code
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::AboveNormal),
            3 => Some(Self::WellAboveNormal),
            _ => None,
        }
    }

    /// Numeric code as stored in the dataset
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Display name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::AboveNormal => "Above normal",
            Self::WellAboveNormal => "Well above normal",
        }
    }

    /// All levels in code order
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Normal, Self::AboveNormal, Self::WellAboveNormal]
    }
}

impl fmt::Display for CategoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Blood pressure status according to the AHA classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodPressureCategory {
    /// Systolic < 120 and diastolic < 80
    Normal = 1,
    /// Systolic 120-129 and diastolic < 80
    Elevated = 2,
    /// Systolic 130-139 or diastolic 80-89
    HypertensionStage1 = 3,
    /// Systolic >= 140 or diastolic >= 90
    HypertensionStage2 = 4,
}

impl BloodPressureCategory {
    /// Classify a systolic/diastolic pair (mmHg)
    #[must_use]
    pub fn classify(systolic: f64, diastolic: f64) -> Self {
        if systolic >= 140.0 || diastolic >= 90.0 {
            Self::HypertensionStage2
        } else if systolic >= 130.0 || diastolic >= 80.0 {
            Self::HypertensionStage1
        } else if systolic >= 120.0 {
            Self::Elevated
        } else {
            Self::Normal
        }
    }

    /// Numeric code (1-4)
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Convert a numeric code
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::Elevated),
            3 => Some(Self::HypertensionStage1),
            4 => Some(Self::HypertensionStage2),
            _ => None,
        }
    }

    /// Display name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::HypertensionStage1 => "Hypertension stage I",
            Self::HypertensionStage2 => "Hypertension stage II",
        }
    }
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Combination of smoking, alcohol and inactivity
///
/// Codes follow the cohort's lifestyle column: 0 is the healthy profile and
/// 7 combines all three risk habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lifestyle {
    /// Non-smoker, no alcohol, physically active
    Healthy = 0,
    /// Smoker
    Smoker = 1,
    /// Alcohol
    Alcohol = 2,
    /// Not active
    NotActive = 3,
    /// Smoker & alcohol
    SmokerAlcohol = 4,
    /// Smoker & not active
    SmokerNotActive = 5,
    /// Alcohol & not active
    AlcoholNotActive = 6,
    /// Smoker & alcohol & not active
    SmokerAlcoholNotActive = 7,
}

impl Lifestyle {
    /// Derive the lifestyle profile from the three habit flags
    #[must_use]
    pub const fn from_habits(smoke: bool, alco: bool, active: bool) -> Self {
        match (smoke, alco, !active) {
            (false, false, false) => Self::Healthy,
            (true, false, false) => Self::Smoker,
            (false, true, false) => Self::Alcohol,
            (false, false, true) => Self::NotActive,
            (true, true, false) => Self::SmokerAlcohol,
            (true, false, true) => Self::SmokerNotActive,
            (false, true, true) => Self::AlcoholNotActive,
            (true, true, true) => Self::SmokerAlcoholNotActive,
        }
    }

    /// Numeric code (0-7)
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Convert a numeric code
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Healthy),
            1 => Some(Self::Smoker),
            2 => Some(Self::Alcohol),
            3 => Some(Self::NotActive),
            4 => Some(Self::SmokerAlcohol),
            5 => Some(Self::SmokerNotActive),
            6 => Some(Self::AlcoholNotActive),
            7 => Some(Self::SmokerAlcoholNotActive),
            _ => None,
        }
    }

    /// Whether this is the healthy profile
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Display name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Healthy => "Non-smoker, No alcohol, Active",
            Self::Smoker => "Smoker",
            Self::Alcohol => "Alcohol",
            Self::NotActive => "Not Active",
            Self::SmokerAlcohol => "Smoker & Alcohol",
            Self::SmokerNotActive => "Smoker & Not active",
            Self::AlcoholNotActive => "Alcohol & Not active",
            Self::SmokerAlcoholNotActive => "Smoker & Alcohol & Not active",
        }
    }
}

impl fmt::Display for Lifestyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
