//! Multiplicity shorthand grammar.
//!
//! Text such as "ddd", "dt", "br d" or "m(tt)" is tokenized into atoms and
//! reduced to a compact code: one digit per splitting level (2 = doublet,
//! 3 = triplet, ...), `1` for a singlet and `m` for a multiplet. The length of
//! the resulting digit list is the number of J-values a peak must report.
//!
//! Rules on the code:
//!   - singlet and multiplet never pair with themselves or each other
//!     ("ss", "sm", "ms", "mm")
//!   - a singlet never combines with another splitting ("sd", "ds")
//!   - a multiplet is only allowed as a prefix ("md", "m(dt)"), never a suffix ("dm")
//!   - a lone singlet, lone multiplet, or bare broad marker expects no J-values

use logos::Logos;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultiplicityError {
    #[error("Invalid multiplicity \"{text}\": singlet and multiplet cannot be combined this way")]
    Exclusive { text: String },
    #[error("Unrecognized multiplicity \"{text}\"")]
    Unrecognized { text: String },
}

/// One recognized piece of multiplicity text (input is lower-cased first)
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[\s\-\x{2013}(),.]+")]
enum Atom {
    #[token("of")]
    Of,

    #[token("br")]
    #[token("broad")]
    Broad,

    // "bs" is common shorthand for a broad singlet
    #[token("bs")]
    BroadSinglet,

    #[regex("singlets?")]
    #[token("s")]
    Singlet,

    #[regex("multiplets?")]
    #[token("m")]
    Multiplet,

    #[regex("doublets?")]
    #[token("d")]
    Doublet,

    #[regex("triplets?")]
    #[token("t")]
    Triplet,

    #[regex("quartets?")]
    #[token("q")]
    Quartet,

    #[regex("quintets?")]
    #[token("quint")]
    #[token("quin")]
    Quintet,

    #[regex("sextets?")]
    #[token("sext")]
    Sextet,

    #[regex("(septet|heptet)s?")]
    #[token("sept")]
    #[token("hept")]
    Septet,

    #[regex("octets?")]
    #[token("oct")]
    Octet,

    #[regex("nonets?")]
    #[token("non")]
    Nonet,

    #[regex("[1-9]", |lex| lex.slice().as_bytes()[0] - b'0')]
    Digit(u8),
}

impl Atom {
    fn code(self) -> Option<char> {
        match self {
            Atom::Of | Atom::Broad => None,
            Atom::Singlet | Atom::BroadSinglet => Some('1'),
            Atom::Multiplet => Some('m'),
            Atom::Doublet => Some('2'),
            Atom::Triplet => Some('3'),
            Atom::Quartet => Some('4'),
            Atom::Quintet => Some('5'),
            Atom::Sextet => Some('6'),
            Atom::Septet => Some('7'),
            Atom::Octet => Some('8'),
            Atom::Nonet => Some('9'),
            Atom::Digit(n) => char::from_digit(n as u32, 10),
        }
    }
}

/// Normalized form of a multiplicity string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Normalized {
    /// Digits 1-9 and `m`, in reading order
    code: String,
    /// A "br"/"broad" qualifier was present
    broad: bool,
}

fn normalize(text: &str) -> Result<Normalized, MultiplicityError> {
    let lowered = text.trim().to_lowercase();
    let mut out = Normalized::default();

    for atom in Atom::lexer(&lowered) {
        let atom = atom.map_err(|_| MultiplicityError::Unrecognized {
            text: text.to_string(),
        })?;
        if matches!(atom, Atom::Broad | Atom::BroadSinglet) {
            out.broad = true;
        }
        if let Some(c) = atom.code() {
            out.code.push(c);
        }
    }

    log::trace!("multiplicity {:?} -> {:?}", text, out);
    Ok(out)
}

/// Apply the combination rules to a normalized code.
fn numbers_from_code(code: &str, text: &str) -> Result<Option<Vec<u8>>, MultiplicityError> {
    let exclusive = || MultiplicityError::Exclusive {
        text: text.to_string(),
    };

    if code.contains('1') || code.contains('m') {
        if ["11", "1m", "m1", "mm"].iter().any(|pair| code.contains(pair)) {
            return Err(exclusive());
        }

        let chars: Vec<char> = code.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let digit_near = |n: Option<char>| n.is_some_and(|n| n.is_ascii_digit());

            if c == '1' && (digit_near(prev) || digit_near(next)) {
                return Err(exclusive());
            }
            if c == 'm' && digit_near(prev) {
                return Err(exclusive());
            }
        }

        if code == "1" || code == "m" {
            return Ok(None);
        }

        if let Some(rest) = code.strip_prefix('m') {
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return Ok(Some(digits(rest)));
            }
        }

        return Err(exclusive());
    }

    if code.is_empty() {
        return Ok(None);
    }

    if code.chars().all(|c| matches!(c, '1'..='9')) {
        Ok(Some(digits(code)))
    } else {
        Err(MultiplicityError::Unrecognized {
            text: text.to_string(),
        })
    }
}

fn digits(code: &str) -> Vec<u8> {
    code.bytes().map(|b| b - b'0').collect()
}

/// Parse multiplicity shorthand into one splitting digit per coupling.
///
/// Returns `Ok(None)` when no J-values are expected (singlet, multiplet,
/// broad alone, or empty text).
pub fn multiplet_numbers(text: &str) -> Result<Option<Vec<u8>>, MultiplicityError> {
    let normalized = normalize(text)?;
    numbers_from_code(&normalized.code, text)
}

/// Number of J-values the multiplicity requires.
pub fn j_value_count(text: &str) -> Result<usize, MultiplicityError> {
    Ok(multiplet_numbers(text)?.map_or(0, |n| n.len()))
}

/// True when the text is a valid multiplicity that names at least one
/// splitting, singlet or multiplet ("s", "dd"), not just "br" or "of".
pub fn is_splitting_term(text: &str) -> bool {
    match normalize(text) {
        Ok(normalized) if !normalized.code.is_empty() => {
            numbers_from_code(&normalized.code, text).is_ok()
        }
        _ => false,
    }
}

/// Whether zero J-values are also acceptable for this multiplicity.
///
/// Only a multiplet or broad qualifier combined with a real splitting
/// ("br d", "m(tt)") makes J-values optional. A bare "br" or "m" requires
/// exactly zero, and anything without a qualifier requires the full count.
pub fn is_j_values_optional(text: &str) -> bool {
    let Ok(normalized) = normalize(text) else {
        return false;
    };
    if !normalized.broad && !normalized.code.contains('m') {
        return false;
    }

    let stripped: String = normalized.code.chars().filter(|&c| c != 'm').collect();
    matches!(numbers_from_code(&stripped, text), Ok(Some(_)))
}
