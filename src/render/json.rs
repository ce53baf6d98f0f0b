//! JSON dump of the intermediate page records.

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a document, including base64 image payloads.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    serialize(doc, format)
}

/// Serialize a document with image payloads emptied.
///
/// Image dimensions, formats and placements are kept, which is usually all
/// that is wanted when inspecting what the parser found.
pub fn to_json_without_image_data(doc: &Document, format: JsonFormat) -> Result<String> {
    let mut outline = doc.clone();
    for image in outline.pages.iter_mut().flat_map(|p| p.images.iter_mut()) {
        image.data.clear();
    }
    serialize(&outline, format)
}

fn serialize(doc: &Document, format: JsonFormat) -> Result<String> {
    match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    }
    .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
