//! Plain text rendering for PDF documents.

use crate::error::Result;
use crate::model::Document;

use super::RenderOptions;

/// Convert a document to plain text.
///
/// Blocks are separated by blank lines and pages by a form feed. Only pages
/// in the options' page selection are included.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let output = doc
        .pages
        .iter()
        .filter(|p| options.page_selection.includes(p.number()))
        .map(|p| p.plain_text())
        .collect::<Vec<_>>()
        .join("\n\x0c\n");

    Ok(output.trim().to_string())
}
