//! Per-page content record.

use super::{DrawingRef, ImageRef, TextBlock};
use serde::{Deserialize, Serialize};

/// Everything extracted from a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// 0-based position in the source document
    pub index: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    pub text_blocks: Vec<TextBlock>,

    pub images: Vec<ImageRef>,

    pub drawings: Vec<DrawingRef>,
}

impl PageContent {
    /// Create an empty page with the given dimensions.
    pub fn new(index: u32, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            text_blocks: Vec::new(),
            images: Vec::new(),
            drawings: Vec::new(),
        }
    }

    /// Create an empty US Letter page (8.5 x 11 inches).
    pub fn letter(index: u32) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// 1-based page number used in markers and element ids.
    pub fn number(&self) -> u32 {
        self.index + 1
    }

    /// Page text, blocks separated by blank lines.
    pub fn plain_text(&self) -> String {
        self.text_blocks
            .iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.text_blocks.is_empty() && self.images.is_empty() && self.drawings.is_empty()
    }
}

impl Default for PageContent {
    fn default() -> Self {
        Self::letter(0)
    }
}
