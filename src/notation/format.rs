//! Journal-style HTML rendering of peak lists.
//!
//! Output uses only `<sup>`, `<sub>`, `<I>`, `<b>` and `<i>` tags, e.g.
//!
//!   <sup>1</sup>H NMR (CDCl<sub>3</sub>, 500 MHz) δ 7.25 (d, <I>J</I> = 7.5 Hz, 1H).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::data::peak::{ChemicalShift, Integration, Metadata, NmrData, Peak};
use crate::notation::shift::{convert_multiplicity_to_text, parse_number};

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static ANY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());

static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)").unwrap());

static DIGIT_GROUPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());

const ALLOWED_TAGS: &[&str] = &["b", "i", "sup", "sub"];

/// Runtime precision above u16::MAX panics in `format!`; f64 never needs more
const MAX_DECIMALS: usize = 340;

/// Precision settings for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    /// Significant figures for chemical shifts
    pub shift_sig_figs: u32,
    /// Significant figures for coupling constants
    pub j_sig_figs: u32,
    /// Decimal places for integrations
    pub integration_decimals: u32,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            shift_sig_figs: 3,
            j_sig_figs: 2,
            integration_decimals: 0,
        }
    }
}

/// Round to `sig_figs` significant figures, keeping trailing zeros.
///
/// Decimal places come from the value's magnitude, so 7.25 and 128.4 both
/// keep the precision that was measured.
pub fn format_sig_figs(value: f64, sig_figs: u32) -> String {
    let magnitude = if value == 0.0 || !value.is_finite() {
        0
    } else {
        value.abs().log10().floor() as i64
    };
    let decimals = (sig_figs as i64 - 1 - magnitude).clamp(0, MAX_DECIMALS as i64) as usize;
    format!("{:.*}", decimals, value)
}

fn format_shift(shift: &ChemicalShift, sig_figs: u32) -> String {
    match *shift {
        ChemicalShift::Single(v) => format_sig_figs(v, sig_figs),
        ChemicalShift::Range(a, b) => format!(
            "{}\u{2013}{}",
            format_sig_figs(a, sig_figs),
            format_sig_figs(b, sig_figs)
        ),
    }
}

/// Remove every tag and decode the few entities the formatter can produce.
pub fn to_plain_text(html: &str) -> String {
    TAGS.replace_all(html, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Keep only b/i/sup/sub tags, without attributes.
pub fn sanitize_html(html: &str) -> String {
    ANY_TAG
        .replace_all(html, |caps: &Captures| {
            let name = caps[2].to_lowercase();
            if ALLOWED_TAGS.contains(&name.as_str()) {
                format!("<{}{}>", &caps[1], name)
            } else {
                String::new()
            }
        })
        .into_owned()
}

fn format_nuclei(nuclei: &str) -> String {
    let nuclei = nuclei.trim();
    if nuclei.contains('<') {
        return nuclei.to_string();
    }
    LEADING_DIGITS
        .replace(nuclei, "<sup>$1</sup>")
        .into_owned()
}

fn format_solvent(solvent: &str) -> String {
    let solvent = solvent.trim();
    if solvent.contains('<') {
        return solvent.to_string();
    }
    DIGIT_GROUPS
        .replace_all(solvent, "<sub>$1</sub>")
        .into_owned()
}

/// Element symbol used after integrations ("<sup>13</sup>C" -> "C").
fn atom_symbol(nuclei: &str) -> String {
    let symbol: String = to_plain_text(nuclei)
        .chars()
        .filter(|c| !c.is_ascii_digit() && !c.is_whitespace())
        .collect();
    if symbol.is_empty() {
        "H".to_string()
    } else {
        symbol
    }
}

fn format_metadata(metadata: &Metadata) -> String {
    let mut head = Vec::new();
    if !metadata.nuclei.trim().is_empty() {
        head.push(format!("{} NMR", format_nuclei(&metadata.nuclei)));
    }

    let mut details = Vec::new();
    if !metadata.solvent.trim().is_empty() {
        details.push(format_solvent(&metadata.solvent));
    }
    if metadata.frequency.is_finite() && metadata.frequency > 0.0 {
        details.push(format!("{} MHz", metadata.frequency));
    }
    if !details.is_empty() {
        head.push(format!("({})", details.join(", ")));
    }

    head.join(" ")
}

fn format_integration(integration: &Integration, decimals: u32, atom: &str) -> Option<String> {
    if integration.is_empty() {
        return None;
    }
    let value = match integration {
        Integration::Value(v) => Some(*v),
        Integration::Text(s) => parse_number(s),
    };
    match (value, integration) {
        (Some(v), _) => Some(format!(
            "{:.*}{}",
            (decimals as usize).min(MAX_DECIMALS),
            v,
            atom
        )),
        (None, Integration::Text(s)) => Some(s.trim().to_string()),
        (None, Integration::Value(_)) => None,
    }
}

fn format_peak(peak: &Peak, settings: &FormatSettings, atom: &str) -> String {
    let shift = format_shift(&peak.chemical_shift, settings.shift_sig_figs);
    let mut parts = Vec::new();

    let multiplicity = convert_multiplicity_to_text(peak.multiplicity.trim());
    if !multiplicity.trim().is_empty() {
        parts.push(multiplicity.trim().to_string());
    }

    let j_values: Vec<String> = peak
        .active_j_values()
        .map(|j| format_sig_figs(j, settings.j_sig_figs))
        .collect();
    if !j_values.is_empty() {
        parts.push(format!("<I>J</I> = {} Hz", j_values.join(", ")));
    }

    if let Some(integration) =
        format_integration(&peak.integration, settings.integration_decimals, atom)
    {
        parts.push(integration);
    }

    let assignment = sanitize_html(peak.assignment.trim());
    if !assignment.is_empty() {
        parts.push(assignment);
    }

    if parts.is_empty() {
        shift
    } else {
        format!("{} ({})", shift, parts.join(", "))
    }
}

/// Render peaks and metadata as an HTML fragment. Empty when there are no peaks.
pub fn generate_formatted_text(
    data: &NmrData,
    shift_sig_figs: u32,
    j_sig_figs: u32,
    integration_decimals: u32,
) -> String {
    if data.peaks.is_empty() {
        return String::new();
    }

    let settings = FormatSettings {
        shift_sig_figs,
        j_sig_figs,
        integration_decimals,
    };
    let atom = atom_symbol(&data.metadata.nuclei);
    let peaks: Vec<String> = data
        .peaks
        .iter()
        .map(|p| format_peak(p, &settings, &atom))
        .collect();

    let head = format_metadata(&data.metadata);
    let body = format!("\u{3b4} {}.", peaks.join(", "));
    if head.is_empty() {
        body
    } else {
        format!("{} {}", head, body)
    }
}

/// [`generate_formatted_text`] with precision taken from `settings`.
pub fn format_with(data: &NmrData, settings: &FormatSettings) -> String {
    generate_formatted_text(
        data,
        settings.shift_sig_figs,
        settings.j_sig_figs,
        settings.integration_decimals,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::text_parser::parse_nmr_text;

    fn proton_metadata() -> Metadata {
        Metadata {
            nuclei: "<sup>1</sup>H".into(),
            solvent: "CDCl<sub>3</sub>".into(),
            frequency: 500.0,
        }
    }

    #[test]
    fn test_reference_output() {
        let data = NmrData {
            peaks: vec![Peak::new(ChemicalShift::Single(7.25), "d", vec![7.5], 1.0)],
            metadata: proton_metadata(),
        };
        let text = generate_formatted_text(&data, 3, 2, 0);
        assert!(text.starts_with(
            "<sup>1</sup>H NMR (CDCl<sub>3</sub>, 500 MHz) \u{3b4} 7.25 (d, <I>J</I> = 7.5 Hz, 1H)"
        ));
        assert!(text.ends_with('.'));
    }

    #[test]
    fn test_no_peaks_is_empty() {
        let data = NmrData {
            peaks: vec![],
            metadata: proton_metadata(),
        };
        assert_eq!(generate_formatted_text(&data, 3, 2, 0), "");
    }

    #[test]
    fn test_sig_figs() {
        assert_eq!(format_sig_figs(7.25, 3), "7.25");
        assert_eq!(format_sig_figs(7.5, 3), "7.50");
        assert_eq!(format_sig_figs(128.4, 4), "128.4");
        assert_eq!(format_sig_figs(128.43, 3), "128");
        assert_eq!(format_sig_figs(0.912, 2), "0.91");
        assert_eq!(format_sig_figs(0.0, 3), "0.00");
        assert_eq!(format_sig_figs(-1.234, 3), "-1.23");
        assert_eq!(format_sig_figs(1234.56, 3), "1235");
    }

    #[test]
    fn test_huge_precision_is_capped() {
        assert_eq!(format_sig_figs(7.25, u32::MAX).len(), 2 + MAX_DECIMALS);

        let data = NmrData {
            peaks: vec![Peak::new(ChemicalShift::Single(7.25), "d", vec![7.5], 1.0)],
            metadata: Metadata::default(),
        };
        let text = generate_formatted_text(&data, 70_000, 70_000, 70_000);
        assert!(text.starts_with("\u{3b4} 7.25"));
        assert!(text.ends_with("H)."));
    }

    #[test]
    fn test_range_and_bare_shift() {
        let data = NmrData {
            peaks: vec![
                Peak::new(ChemicalShift::Range(7.53, 7.5), "m", vec![], 2.0),
                Peak::new(ChemicalShift::Single(3.8), "", vec![], Integration::default()),
            ],
            metadata: Metadata::default(),
        };
        assert_eq!(
            generate_formatted_text(&data, 3, 2, 0),
            "\u{3b4} 7.53\u{2013}7.50 (m, 2H), 3.80."
        );
    }

    #[test]
    fn test_metadata_clauses() {
        let mut meta = Metadata {
            nuclei: "13C".into(),
            solvent: "DMSO-d6".into(),
            frequency: 0.0,
        };
        assert_eq!(
            format_metadata(&meta),
            "<sup>13</sup>C NMR (DMSO-d<sub>6</sub>)"
        );

        meta.solvent.clear();
        meta.frequency = 100.6;
        assert_eq!(format_metadata(&meta), "<sup>13</sup>C NMR (100.6 MHz)");

        meta.nuclei.clear();
        meta.frequency = 0.0;
        assert_eq!(format_metadata(&meta), "");
    }

    #[test]
    fn test_integration_uses_nucleus_symbol() {
        let data = NmrData {
            peaks: vec![Peak::new(ChemicalShift::Single(128.4), "", vec![], 2.0)],
            metadata: Metadata {
                nuclei: "<sup>13</sup>C".into(),
                ..Default::default()
            },
        };
        assert_eq!(
            generate_formatted_text(&data, 4, 2, 0),
            "<sup>13</sup>C NMR \u{3b4} 128.4 (2C)."
        );
    }

    #[test]
    fn test_integration_variants() {
        assert_eq!(format_integration(&Integration::Value(1.5), 1, "H").as_deref(), Some("1.5H"));
        assert_eq!(format_integration(&Integration::Value(0.0), 0, "H"), None);
        assert_eq!(format_integration(&"3".into(), 0, "H").as_deref(), Some("3H"));
        assert_eq!(format_integration(&"NH".into(), 0, "H").as_deref(), Some("NH"));
        assert_eq!(format_integration(&"".into(), 0, "H"), None);
    }

    #[test]
    fn test_peak_parts() {
        let atom = "H";
        let settings = FormatSettings::default();

        let peak = Peak::new(ChemicalShift::Single(7.1), "23", vec![8.0, 0.0, 2.1], 1.0)
            .with_assignment("H-4");
        assert_eq!(
            format_peak(&peak, &settings, atom),
            "7.10 (dt, <I>J</I> = 8.0, 2.1 Hz, 1H, H-4)"
        );
    }

    #[test]
    fn test_sanitize_assignment() {
        assert_eq!(
            sanitize_html("H-4, <script>x</script><B class=\"a\">Ar</B>"),
            "H-4, x<b>Ar</b>"
        );
        let clean = "CH<sub>3</sub>, <i>ortho</i>";
        assert_eq!(sanitize_html(clean), clean);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            to_plain_text("<sup>1</sup>H NMR (CDCl<sub>3</sub>) &amp; <I>J</I>"),
            "1H NMR (CDCl3) & J"
        );
    }

    #[test]
    fn test_format_with_settings() {
        let data = NmrData {
            peaks: vec![Peak::new(ChemicalShift::Single(7.2512), "d", vec![7.512], 1.0)],
            metadata: Metadata::default(),
        };
        let settings = FormatSettings {
            shift_sig_figs: 4,
            j_sig_figs: 3,
            integration_decimals: 1,
        };
        assert_eq!(
            format_with(&data, &settings),
            "\u{3b4} 7.251 (d, <I>J</I> = 7.51 Hz, 1.0H)."
        );
    }

    #[test]
    fn test_parse_then_format_is_stable() {
        let data = NmrData {
            peaks: vec![
                Peak::new(ChemicalShift::Range(7.53, 7.5), "m", vec![], 2.0),
                Peak::new(ChemicalShift::Single(7.25), "dd", vec![8.4, 2.0], 1.0),
                Peak::new(ChemicalShift::Single(3.8), "s", vec![], 3.0),
            ],
            metadata: Metadata {
                frequency: 400.0,
                ..proton_metadata()
            },
        };
        let first = generate_formatted_text(&data, 3, 2, 0);
        let reparsed = parse_nmr_text(&first);
        assert_eq!(reparsed.peaks.len(), 3);
        assert_eq!(reparsed.metadata, data.metadata);
        assert_eq!(generate_formatted_text(&reparsed, 3, 2, 0), first);
    }
}
