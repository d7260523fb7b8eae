use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)").unwrap());

/// Read the numeric prefix of a string ("2H" -> 2, " 1.5 " -> 1.5).
pub fn leading_number(text: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Peak position in ppm: a single value or a range written low/high as given
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChemicalShift {
    Single(f64),
    Range(f64, f64),
}

impl ChemicalShift {
    /// Value used for ordering peaks: the larger end of a range.
    pub fn sort_key(&self) -> f64 {
        match *self {
            ChemicalShift::Single(v) => v,
            ChemicalShift::Range(a, b) => a.max(b),
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            ChemicalShift::Single(v) => v.is_finite(),
            ChemicalShift::Range(a, b) => a.is_finite() && b.is_finite(),
        }
    }
}

impl Default for ChemicalShift {
    fn default() -> Self {
        ChemicalShift::Single(0.0)
    }
}

impl std::fmt::Display for ChemicalShift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChemicalShift::Single(v) => write!(f, "{}", v),
            ChemicalShift::Range(a, b) => write!(f, "{}\u{2013}{}", a, b),
        }
    }
}

/// Relative peak area. Free-form text is kept as typed; empty or zero is "absent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Integration {
    Value(f64),
    Text(String),
}

impl Integration {
    /// Numeric reading of the integration, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Integration::Value(v) if v.is_nan() => None,
            Integration::Value(v) => Some(*v),
            Integration::Text(s) => leading_number(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Integration::Value(v) => *v == 0.0 || v.is_nan(),
            Integration::Text(s) => s.trim().is_empty() || leading_number(s) == Some(0.0),
        }
    }
}

impl Default for Integration {
    fn default() -> Self {
        Integration::Text(String::new())
    }
}

impl From<f64> for Integration {
    fn from(v: f64) -> Self {
        Integration::Value(v)
    }
}

impl From<&str> for Integration {
    fn from(s: &str) -> Self {
        Integration::Text(s.to_string())
    }
}

/// A single reported NMR signal
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Peak {
    pub chemical_shift: ChemicalShift,
    /// Raw shorthand ("dd", "br s") or full word, case-insensitive
    pub multiplicity: String,
    /// Coupling constants in Hz
    pub j_values: Vec<f64>,
    pub integration: Integration,
    /// Limited HTML (b/i/sup/sub)
    pub assignment: String,
}

impl Peak {
    pub fn new(
        chemical_shift: ChemicalShift,
        multiplicity: &str,
        j_values: Vec<f64>,
        integration: impl Into<Integration>,
    ) -> Self {
        Self {
            chemical_shift,
            multiplicity: multiplicity.to_string(),
            j_values,
            integration: integration.into(),
            assignment: String::new(),
        }
    }

    pub fn with_assignment(mut self, assignment: &str) -> Self {
        self.assignment = assignment.to_string();
        self
    }

    /// Non-zero, non-NaN coupling constants in their stored order.
    pub fn active_j_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.j_values
            .iter()
            .copied()
            .filter(|j| !j.is_nan() && *j != 0.0)
    }

    /// Make every J-value non-negative and order them largest first.
    pub fn correct_j_values(&mut self) {
        for j in self.j_values.iter_mut() {
            *j = j.abs();
        }
        self.j_values.sort_by(|a, b| b.total_cmp(a));
    }
}

impl std::fmt::Display for Peak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ppm", self.chemical_shift)?;
        if !self.multiplicity.is_empty() {
            write!(f, " ({}", self.multiplicity)?;
            let js: Vec<String> = self.active_j_values().map(|j| j.to_string()).collect();
            if !js.is_empty() {
                write!(f, ", J={} Hz", js.join(", "))?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Spectrum-level metadata. Nuclei and solvent may carry sup/sub tags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub nuclei: String,
    pub solvent: String,
    /// Spectrometer frequency in MHz, 0 when unknown
    pub frequency: f64,
}

impl Metadata {
    /// Empty nuclei or any spelling of 1H counts as a proton spectrum.
    pub fn is_proton(&self) -> bool {
        let plain = crate::notation::format::to_plain_text(&self.nuclei);
        let plain = plain.trim();
        plain.is_empty() || plain.eq_ignore_ascii_case("1H")
    }
}

/// Peaks plus metadata, owned by the caller and edited in place
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NmrData {
    pub peaks: Vec<Peak>,
    pub metadata: Metadata,
}

impl NmrData {
    /// Sort peaks by ppm descending (NMR convention: high ppm first)
    pub fn sort_peaks(&mut self) {
        self.peaks.sort_by(|a, b| {
            b.chemical_shift
                .sort_key()
                .total_cmp(&a.chemical_shift.sort_key())
        });
    }

    /// Apply the J-value correction to every peak.
    pub fn correct_j_values(&mut self) {
        for peak in self.peaks.iter_mut() {
            peak.correct_j_values();
        }
    }
}
