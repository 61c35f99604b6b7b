//! Summary module - renders clinical summary text as a sectioned document.

mod document;
mod parser;

pub use document::{escape_html, Block, ListKind, Section, SummaryDocument, SUMMARY_TITLE};
pub use parser::{SummaryParser, DEFAULT_EMPHASIZED, DEFAULT_SECTIONS};
