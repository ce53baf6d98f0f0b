//! PDF parsing module.

mod content;
mod images;
mod layout;
mod options;
mod pdf_parser;

pub use layout::{group_into_blocks, group_lines_into_blocks, group_spans_into_lines};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::PdfParser;
