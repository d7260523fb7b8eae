//! Chemical shift parsing and numeric multiplicity shorthand.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::peak::ChemicalShift;

const NUMBER: &str = r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)";

static SHIFT_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({NUMBER})\s*[-\x{{2013}}]\s*({NUMBER})$")).unwrap()
});

static SHIFT_SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"^({NUMBER})$")).unwrap());

/// Parse "7.25" or a range "7.53-7.50" / "7.53–7.50".
///
/// A range is tried first. Returns `None` for empty or unparseable text.
pub fn parse_chemical_shift(text: &str) -> Option<ChemicalShift> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = SHIFT_RANGE.captures(text) {
        let low = caps[1].parse::<f64>().ok()?;
        let high = caps[2].parse::<f64>().ok()?;
        return Some(ChemicalShift::Range(low, high));
    }

    parse_number(text).map(ChemicalShift::Single)
}

/// Parse a plain decimal number token ("7.5", "-0.25", ".9").
pub fn parse_number(text: &str) -> Option<f64> {
    SHIFT_SINGLE
        .captures(text.trim())
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

fn digit_to_multiplicity(digit: char) -> Option<&'static str> {
    match digit {
        '1' => Some("s"),
        '2' => Some("d"),
        '3' => Some("t"),
        '4' => Some("q"),
        '5' => Some("quint"),
        _ => None,
    }
}

/// Expand keypad shorthand ("23" -> "dt"). Digits above 5 are dropped and
/// anything that is not purely digits 1-9 is returned unchanged.
pub fn convert_multiplicity_to_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| matches!(c, '1'..='9')) {
        return text.to_string();
    }
    trimmed.chars().filter_map(digit_to_multiplicity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        assert_eq!(parse_chemical_shift("7.25"), Some(ChemicalShift::Single(7.25)));
        assert_eq!(parse_chemical_shift("  128.4 "), Some(ChemicalShift::Single(128.4)));
        assert_eq!(parse_chemical_shift("-0.5"), Some(ChemicalShift::Single(-0.5)));
        assert_eq!(parse_chemical_shift(".9"), Some(ChemicalShift::Single(0.9)));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_chemical_shift("7.53\u{2013}7.50"),
            Some(ChemicalShift::Range(7.53, 7.50))
        );
        assert_eq!(
            parse_chemical_shift("3.10 - 3.20"),
            Some(ChemicalShift::Range(3.10, 3.20))
        );
        // Order is kept as written
        assert_eq!(
            parse_chemical_shift("1-2"),
            Some(ChemicalShift::Range(1.0, 2.0))
        );
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(parse_chemical_shift("abc"), None);
        assert_eq!(parse_chemical_shift(""), None);
        assert_eq!(parse_chemical_shift("7.2.5"), None);
        assert_eq!(parse_chemical_shift("7.25 ppm"), None);
    }

    #[test]
    fn test_convert_multiplicity() {
        assert_eq!(convert_multiplicity_to_text("23"), "dt");
        assert_eq!(convert_multiplicity_to_text("16"), "s");
        assert_eq!(convert_multiplicity_to_text("222"), "ddd");
        assert_eq!(convert_multiplicity_to_text("5"), "quint");
        assert_eq!(convert_multiplicity_to_text("dd"), "dd");
        assert_eq!(convert_multiplicity_to_text("20"), "20");
        assert_eq!(convert_multiplicity_to_text(""), "");
    }
}
