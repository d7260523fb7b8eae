//! Advisory validation of peaks and metadata.
//!
//! Findings are returned, never raised; the caller decides whether any of
//! them should block an action.

use serde::{Deserialize, Serialize};

use crate::data::peak::{Metadata, NmrData, Peak};
use crate::notation::multiplicity::{is_j_values_optional, j_value_count};

/// Smallest integration considered meaningful
pub const MIN_INTEGRATION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Metadata,
    Peak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationField {
    #[serde(rename = "jcount")]
    JCount,
    Integration,
    Multiplicity,
    ChemicalShift,
    Frequency,
}

impl std::fmt::Display for ValidationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationField::JCount => write!(f, "jcount"),
            ValidationField::Integration => write!(f, "integration"),
            ValidationField::Multiplicity => write!(f, "multiplicity"),
            ValidationField::ChemicalShift => write!(f, "chemicalShift"),
            ValidationField::Frequency => write!(f, "frequency"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    /// Peak position in its list; `None` for metadata findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub field: ValidationField,
    pub message: String,
}

impl ValidationError {
    fn peak(index: usize, field: ValidationField, message: String) -> Self {
        Self {
            kind: ErrorKind::Peak,
            index: Some(index),
            field,
            message,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(i) => write!(f, "peak {} [{}]: {}", i + 1, self.field, self.message),
            None => write!(f, "metadata [{}]: {}", self.field, self.message),
        }
    }
}

/// Check J-value count, integration and shift of one peak.
pub fn validate_peak(peak: &Peak, index: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !peak.chemical_shift.is_finite() {
        errors.push(ValidationError::peak(
            index,
            ValidationField::ChemicalShift,
            "Chemical shift must be a finite number".to_string(),
        ));
    }

    let multiplicity = peak.multiplicity.trim();
    if !multiplicity.is_empty() {
        match j_value_count(multiplicity) {
            Ok(expected) => {
                let found = peak.active_j_values().count();
                let optional = is_j_values_optional(multiplicity);
                let ok = found == expected || (optional && found == 0);
                if !ok {
                    let expects = if optional {
                        format!("0 or {}", expected)
                    } else {
                        expected.to_string()
                    };
                    errors.push(ValidationError::peak(
                        index,
                        ValidationField::JCount,
                        format!(
                            "Multiplicity \"{}\" expects {} J-values, but found {}",
                            multiplicity, expects, found
                        ),
                    ));
                }
            }
            Err(e) => {
                log::debug!("Peak {}: {}", index, e);
                errors.push(ValidationError::peak(
                    index,
                    ValidationField::Multiplicity,
                    e.to_string(),
                ));
            }
        }
    }

    if let Some(value) = peak.integration.as_number() {
        if value < MIN_INTEGRATION {
            errors.push(ValidationError::peak(
                index,
                ValidationField::Integration,
                format!(
                    "Integration should be at least {}, but found {}",
                    MIN_INTEGRATION, value
                ),
            ));
        }
    }

    errors
}

/// Check spectrum-level fields.
pub fn validate_metadata(metadata: &Metadata) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if !(metadata.frequency.is_finite() && metadata.frequency > 0.0) {
        errors.push(ValidationError {
            kind: ErrorKind::Metadata,
            index: None,
            field: ValidationField::Frequency,
            message: format!(
                "Frequency should be a positive number of MHz, but found {}",
                metadata.frequency
            ),
        });
    }
    errors
}

/// Metadata findings followed by every peak's findings, in list order.
pub fn validate(data: &NmrData) -> Vec<ValidationError> {
    let mut errors = validate_metadata(&data.metadata);
    for (i, peak) in data.peaks.iter().enumerate() {
        errors.extend(validate_peak(peak, i));
    }
    errors
}
