//! NMR peak notation engine.
//!
//! Parses multiplicity shorthand ("ddd", "br d", "m(tt)") into expected
//! J-value counts, turns pasted spectrum descriptions into structured peak
//! lists, validates them, and renders them back as journal-style HTML.

pub mod data;
pub mod notation;

pub use data::peak::{ChemicalShift, Integration, Metadata, NmrData, Peak};
pub use data::presets::Presets;
pub use notation::format::{generate_formatted_text, to_plain_text, FormatSettings};
pub use notation::multiplicity::{
    is_j_values_optional, j_value_count, multiplet_numbers, MultiplicityError,
};
pub use notation::shift::{convert_multiplicity_to_text, parse_chemical_shift};
pub use notation::text_parser::{parse_nmr_text, parse_nmr_text_with};
pub use notation::validate::{validate, validate_peak, ErrorKind, ValidationError, ValidationField};
