//! spendlens-ingest: PDF page extraction, table and text interpreters, and
//! candidate normalization.

pub mod extract;
pub mod layout;
pub mod normalize;
pub mod parsers;
pub mod patterns;
pub mod strategy;
pub mod tables;

pub use extract::{extract_pages, open_document};
pub use normalize::{Normalized, normalize, validate_candidate};
pub use strategy::interpret_page;
