//! Free-text NMR spectrum parser
//!
//! Turns a pasted spectrum description such as
//!
//!   1H NMR (400 MHz, CDCl3) δ 7.26 (d, J = 8.4 Hz, 2H), 3.80 (s, 3H).
//!
//! into [`NmrData`]. Parsing is heuristic and never fails: metadata is
//! looked up against the preset tables, the text is cut into segments at
//! `)` and `:`, and each segment goes through a single-pass token
//! classifier. Segments without a recognizable chemical shift are dropped.
//!
//! Token rules, first match wins:
//!   a. one of the last two tokens shaped like "3H" / "2C", or a bare integer
//!      (last, or before a bare element symbol) once a shift is known -> integration
//!   b. no shift yet -> chemical shift (range, then single number)
//!   c. shift known and numeric -> J-value
//!   d. shift known, multiplicity unset (or only "br" so far), multiplicity-like -> multiplicity
//!   e. anything else is discarded

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::peak::{ChemicalShift, Integration, Metadata, NmrData, Peak};
use crate::data::presets::{find_frequency, Presets};
use crate::notation::format::to_plain_text;
use crate::notation::multiplicity::is_splitting_term;
use crate::notation::shift::{parse_chemical_shift, parse_number};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// "7.53 - 7.50" -> "7.53–7.50" so a spaced range stays one token
static SPACED_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)\s*[-\x{2013}]\s*(\d)").unwrap());

static INTEGRATION_WITH_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)[A-Z][a-z]?$").unwrap());

static BARE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

static ELEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]?$").unwrap());

static MULTIPLICITY_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\s-]+$").unwrap());

const DELTA: char = '\u{3b4}';

/// Parse a spectrum description using the built-in preset tables.
pub fn parse_nmr_text(text: &str) -> NmrData {
    parse_nmr_text_with(text, Presets::builtin())
}

/// Parse a spectrum description against caller-supplied preset tables.
pub fn parse_nmr_text_with(text: &str, presets: &Presets) -> NmrData {
    let cleaned = clean_text(text);
    let metadata = extract_metadata(&cleaned, presets);
    let proton = metadata.is_proton();

    let mut peaks = Vec::new();
    for segment in split_segments(&cleaned, presets, proton) {
        match parse_single_peak(&segment) {
            Some(peak) => peaks.push(peak),
            None => log::debug!("No chemical shift in segment {:?}, skipped", segment),
        }
    }

    log::debug!(
        "Parsed {} peaks (nuclei={:?}, solvent={:?}, {} MHz)",
        peaks.len(),
        metadata.nuclei,
        metadata.solvent,
        metadata.frequency
    );
    NmrData { peaks, metadata }
}

/// Strip markup, fold Unicode digits and collapse whitespace.
fn clean_text(text: &str) -> String {
    let untagged = to_plain_text(text);
    let folded: String = untagged.chars().map(fold_char).collect();
    let collapsed = WHITESPACE.replace_all(&folded, " ");
    let ranged = SPACED_RANGE.replace_all(collapsed.trim(), "$1\u{2013}$2");
    ranged.trim_end_matches('.').trim().to_string()
}

fn fold_char(c: char) -> char {
    match c {
        '\u{2070}' | '\u{2080}' => '0',
        '\u{b9}' | '\u{2081}' => '1',
        '\u{b2}' | '\u{2082}' => '2',
        '\u{b3}' | '\u{2083}' => '3',
        '\u{2074}'..='\u{2079}' => char::from_u32(c as u32 - 0x2074 + '4' as u32).unwrap_or(c),
        '\u{2084}'..='\u{2089}' => char::from_u32(c as u32 - 0x2084 + '4' as u32).unwrap_or(c),
        '\u{a0}' | '\u{2009}' | '\u{202f}' => ' ',
        '\u{2212}' => '-',
        _ => c,
    }
}

fn extract_metadata(cleaned: &str, presets: &Presets) -> Metadata {
    Metadata {
        nuclei: presets
            .find_nuclei(cleaned)
            .map(|p| p.display.clone())
            .unwrap_or_default(),
        solvent: presets
            .find_solvent(cleaned)
            .map(|p| p.display.clone())
            .unwrap_or_default(),
        frequency: find_frequency(cleaned).unwrap_or(0.0),
    }
}

/// Cut cleaned text into candidate peak segments.
fn split_segments(cleaned: &str, presets: &Presets, proton: bool) -> Vec<String> {
    let mut segments = Vec::new();

    for raw in cleaned.split([')', ':']) {
        let raw = raw.trim();
        if raw.chars().count() <= 2 {
            continue;
        }

        // Anything before δ describes the experiment
        let candidate = match raw.rfind(DELTA) {
            Some(pos) => &raw[pos + DELTA.len_utf8()..],
            None if presets.is_metadata_fragment(raw) => {
                log::trace!("Metadata segment {:?}", raw);
                continue;
            }
            None => raw,
        };

        if proton {
            segments.push(candidate.to_string());
        } else {
            segments.extend(split_shift_list(candidate));
        }
    }

    segments
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Heteronuclear lists put several bare shifts before one parenthetical:
/// "170.1, 135.2 (d, J = 3 Hz" -> ["170.1", "135.2 (d, J = 3 Hz"]
fn split_shift_list(segment: &str) -> Vec<String> {
    let (prefix, details) = segment.split_at(segment.find('(').unwrap_or(segment.len()));
    let mut pieces: Vec<String> = prefix.split(',').map(str::to_string).collect();
    if let Some(last) = pieces.last_mut() {
        last.push_str(details);
    }
    pieces
}

fn is_broad_only(multiplicity: &str) -> bool {
    matches!(
        multiplicity.trim().to_lowercase().as_str(),
        "br" | "broad"
    )
}

/// Rule (a): returns the integration value and how many tokens it consumed.
fn integration_at(tokens: &[&str], i: usize, shift_known: bool) -> Option<(f64, usize)> {
    let n = tokens.len();
    let is_last = i + 1 == n;
    let second_to_last = i + 2 == n;
    if n < 2 || !(is_last || second_to_last) {
        return None;
    }

    // "1H, NH": an assignment may follow the integration
    let token = tokens[i];
    if let Some(caps) = INTEGRATION_WITH_ELEMENT.captures(token) {
        return caps[1].parse::<f64>().ok().map(|v| (v, 1));
    }

    let before_element =
        second_to_last && tokens[n - 1] != "Hz" && ELEMENT.is_match(tokens[n - 1]);
    if shift_known && BARE_INTEGER.is_match(token) && (is_last || before_element) {
        let consumed = if before_element { 2 } else { 1 };
        return token.parse::<f64>().ok().map(|v| (v, consumed));
    }
    None
}

/// Classify the tokens of one segment into a peak.
pub fn parse_single_peak(segment: &str) -> Option<Peak> {
    let tokens: Vec<&str> = segment
        .split(|c: char| c == '(' || c == ')' || c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    let mut shift: Option<ChemicalShift> = None;
    let mut multiplicity = String::new();
    let mut j_values = Vec::new();
    let mut integration = Integration::default();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        if let Some((value, consumed)) = integration_at(&tokens, i, shift.is_some()) {
            integration = Integration::Value(value);
            i += consumed;
            continue;
        }

        if shift.is_none() {
            shift = parse_chemical_shift(token);
        } else if let Some(j) = parse_number(token) {
            j_values.push(j);
        } else if multiplicity.is_empty() && MULTIPLICITY_LIKE.is_match(token) {
            multiplicity = token.to_string();
        } else if is_broad_only(&multiplicity) && is_splitting_term(token) {
            multiplicity = format!("{} {}", multiplicity, token);
        } else {
            log::trace!("Discarded token {:?} in {:?}", token, segment);
        }
        i += 1;
    }

    Some(Peak {
        chemical_shift: shift?,
        multiplicity,
        j_values,
        integration,
        assignment: String::new(),
    })
}
