//! Nuclei and solvent lookup tables used to recognize spectrum metadata.
//!
//! Each preset pairs the HTML display string stored in [`Metadata`] with a
//! case-insensitive pattern run against cleaned, tag-free text. Tables are
//! ordered; the first matching preset wins.
//!
//! [`Metadata`]: crate::data::peak::Metadata

use once_cell::sync::Lazy;
use regex::Regex;

/// (display, pattern) for the built-in nuclei. Patterns require a trailing
/// "NMR" so integrations such as "1H" or "2C" never count as a nucleus.
const NUCLEI: &[(&str, &str)] = &[
    ("<sup>1</sup>H", r"(?i)\b1H(?:\s*\{[^}]*\})?[\s-]*NMR|\bproton[\s-]+NMR"),
    ("<sup>13</sup>C", r"(?i)\b13C(?:\s*\{[^}]*\})?[\s-]*NMR|\bcarbon[\s-]+NMR"),
    ("<sup>19</sup>F", r"(?i)\b19F(?:\s*\{[^}]*\})?[\s-]*NMR"),
    ("<sup>31</sup>P", r"(?i)\b31P(?:\s*\{[^}]*\})?[\s-]*NMR"),
    ("<sup>11</sup>B", r"(?i)\b11B(?:\s*\{[^}]*\})?[\s-]*NMR"),
    ("<sup>15</sup>N", r"(?i)\b15N(?:\s*\{[^}]*\})?[\s-]*NMR"),
    ("<sup>29</sup>Si", r"(?i)\b29Si(?:\s*\{[^}]*\})?[\s-]*NMR"),
];

const SOLVENTS: &[(&str, &str)] = &[
    ("CDCl<sub>3</sub>", r"(?i)\bCDCl3\b|\bchloroform-d\b"),
    ("CD<sub>2</sub>Cl<sub>2</sub>", r"(?i)\bCD2Cl2\b|\bdichloromethane-d2\b"),
    ("DMSO-d<sub>6</sub>", r"(?i)\bDMSO(?:-d6)?\b|\(CD3\)2SO"),
    ("CD<sub>3</sub>OD", r"(?i)\bCD3OD\b|\bMeOD\b|\bmethanol-d4\b"),
    ("D<sub>2</sub>O", r"(?i)\bD2O\b"),
    ("C<sub>6</sub>D<sub>6</sub>", r"(?i)\bC6D6\b|\bbenzene-d6\b"),
    ("acetone-d<sub>6</sub>", r"(?i)\bacetone-d6\b|\(CD3\)2CO"),
    ("CD<sub>3</sub>CN", r"(?i)\bCD3CN\b|\bacetonitrile-d3\b"),
    ("THF-d<sub>8</sub>", r"(?i)\bTHF-d8\b"),
    ("toluene-d<sub>8</sub>", r"(?i)\btoluene-d8\b"),
];

static FREQUENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*MHz").unwrap());

static BUILTIN: Lazy<Presets> = Lazy::new(|| {
    Presets::new(NUCLEI, SOLVENTS).expect("built-in preset patterns are valid")
});

/// A display string with the pattern that recognizes it
#[derive(Debug, Clone)]
pub struct Preset {
    pub display: String,
    pattern: Regex,
}

impl Preset {
    pub fn new(display: &str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            display: display.to_string(),
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Immutable nuclei/solvent tables handed to the free-text parser
#[derive(Debug, Clone)]
pub struct Presets {
    pub nuclei: Vec<Preset>,
    pub solvents: Vec<Preset>,
}

impl Presets {
    /// Build tables from (display, pattern) pairs, keeping their order.
    pub fn new(nuclei: &[(&str, &str)], solvents: &[(&str, &str)]) -> Result<Self, regex::Error> {
        fn build(table: &[(&str, &str)]) -> Result<Vec<Preset>, regex::Error> {
            table.iter().map(|(d, p)| Preset::new(d, p)).collect()
        }
        Ok(Self {
            nuclei: build(nuclei)?,
            solvents: build(solvents)?,
        })
    }

    /// The built-in tables, compiled once.
    pub fn builtin() -> &'static Presets {
        &BUILTIN
    }

    pub fn find_nuclei(&self, text: &str) -> Option<&Preset> {
        self.nuclei.iter().find(|p| p.is_match(text))
    }

    pub fn find_solvent(&self, text: &str) -> Option<&Preset> {
        self.solvents.iter().find(|p| p.is_match(text))
    }

    /// True when a text fragment describes the experiment rather than a peak.
    pub fn is_metadata_fragment(&self, text: &str) -> bool {
        self.find_nuclei(text).is_some()
            || self.find_solvent(text).is_some()
            || find_frequency(text).is_some()
    }
}

/// First "NNN MHz" in the text.
pub fn find_frequency(text: &str) -> Option<f64> {
    FREQUENCY
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nuclei() {
        let presets = Presets::builtin();
        let hit = |t: &str| presets.find_nuclei(t).map(|p| p.display.clone());

        assert_eq!(hit("1H NMR (400 MHz, CDCl3)").as_deref(), Some("<sup>1</sup>H"));
        assert_eq!(hit("13C{1H} NMR (101 MHz)").as_deref(), Some("<sup>13</sup>C"));
        assert_eq!(hit("19F-NMR").as_deref(), Some("<sup>19</sup>F"));
        // An integration is not a nucleus
        assert_eq!(hit("7.26 (s, 1H"), None);
    }

    #[test]
    fn test_find_solvent() {
        let presets = Presets::builtin();
        let hit = |t: &str| presets.find_solvent(t).map(|p| p.display.clone());

        assert_eq!(hit("(400 MHz, cdcl3)").as_deref(), Some("CDCl<sub>3</sub>"));
        assert_eq!(hit("DMSO-d6").as_deref(), Some("DMSO-d<sub>6</sub>"));
        assert_eq!(hit("in MeOD").as_deref(), Some("CD<sub>3</sub>OD"));
        assert_eq!(hit("CD2Cl2").as_deref(), Some("CD<sub>2</sub>Cl<sub>2</sub>"));
        assert_eq!(hit("7.26 (s, 1H"), None);
    }

    #[test]
    fn test_find_frequency() {
        assert_eq!(find_frequency("(400 MHz, CDCl3)"), Some(400.0));
        assert_eq!(find_frequency("100.6mhz"), Some(100.6));
        assert_eq!(find_frequency("no field here"), None);
    }

    #[test]
    fn test_custom_tables_keep_order() {
        let presets = Presets::new(&[("A", "x"), ("B", "x")], &[]).unwrap();
        assert_eq!(presets.find_nuclei("x").unwrap().display, "A");
        assert!(Presets::new(&[("bad", "(")], &[]).is_err());
    }
}
