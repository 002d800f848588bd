use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fixed four-column header of the growth sheet. Column order and names
/// never change; the whole pipeline assumes this layout.
pub const HEADER: [&str; 4] = ["Child Name", "Sex", "Age (Months)", "Height (cm)"];

/// Default worksheet tab targeted when the user leaves the field blank.
pub const DEFAULT_WORKSHEET: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Label written into the sheet and shown in the form.
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }

    /// Parse a label back into the enum (case-insensitive).
    pub fn from_label(label: &str) -> Option<Sex> {
        match label.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field-level validation failures for a submitted record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("child name must not be empty")]
    EmptyName,
    #[error("age must be between 0 and 72 months, got {0}")]
    AgeOutOfRange(u32),
    #[error("height must be a non-negative number of centimeters, got {0}")]
    InvalidHeight(f64),
}

/// One child-growth measurement: name, sex, age in months, height in cm.
///
/// A `Record` can only be built through [`Record::new`], which enforces the
/// field constraints, so every `Record` in the system is valid. Records have
/// no identity beyond their row position and duplicates are permitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    sex: Sex,
    age_months: u32,
    height_cm: f64,
}

impl Record {
    /// Inclusive upper bound on age, matching the form's spinner range.
    pub const MAX_AGE_MONTHS: u32 = 72;

    /// Validate the four fields and build a record.
    ///
    /// # Arguments
    /// * `name` - Child name; leading/trailing whitespace is trimmed off
    /// * `sex` - Male or female
    /// * `age_months` - Age in months, 0 to 72 inclusive
    /// * `height_cm` - Height in centimeters, non-negative and finite
    ///
    /// # Returns
    /// * `Result<Record, RecordError>` - The record, or the first failing
    ///   constraint
    pub fn new(name: &str, sex: Sex, age_months: u32, height_cm: f64) -> Result<Self, RecordError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }
        if age_months > Self::MAX_AGE_MONTHS {
            return Err(RecordError::AgeOutOfRange(age_months));
        }
        if !height_cm.is_finite() || height_cm < 0.0 {
            return Err(RecordError::InvalidHeight(height_cm));
        }

        Ok(Record {
            name: name.to_string(),
            sex,
            age_months,
            height_cm,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn age_months(&self) -> u32 {
        self.age_months
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    /// The four cell values in header order. Height is formatted with one
    /// decimal place, the sheet's display precision.
    pub fn to_cells(&self) -> [String; 4] {
        [
            self.name.clone(),
            self.sex.label().to_string(),
            self.age_months.to_string(),
            format!("{:.1}", self.height_cm),
        ]
    }
}
