pub mod format;
pub mod multiplicity;
pub mod shift;
pub mod text_parser;
pub mod validate;
