//! Text records: spans grouped into lines grouped into blocks.

use serde::{Deserialize, Serialize};

use super::{Color, Rect};

/// Font size that renders without an inline `font-size` style.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// A run of text drawn with a single font, size and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Bounding box in page space
    pub bbox: Rect,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font: String,
    /// Effective font size in points
    pub size: f32,
    /// Fill color
    pub color: Color,
    /// Font name mentions "bold"
    pub bold: bool,
    /// Font name mentions "italic"
    pub italic: bool,
}

impl Span {
    /// Create a span, deriving the bold/italic flags from the font name.
    pub fn new(text: impl Into<String>, bbox: Rect, font: impl Into<String>, size: f32, color: Color) -> Self {
        let font = font.into();
        let lower = font.to_lowercase();
        Self {
            text: text.into(),
            bbox,
            bold: lower.contains("bold"),
            italic: lower.contains("italic"),
            font,
            size,
            color,
        }
    }

    /// Whether the size differs from [`DEFAULT_FONT_SIZE`].
    pub fn has_custom_size(&self) -> bool {
        (self.size - DEFAULT_FONT_SIZE).abs() > f32::EPSILON
    }
}

/// Spans sharing a baseline, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub bbox: Rect,
    pub spans: Vec<Span>,
}

impl Line {
    /// Build a line, sorting spans left to right and computing the bounding box.
    pub fn from_spans(mut spans: Vec<Span>) -> Self {
        spans.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(std::cmp::Ordering::Equal));
        let bbox = Rect::union_all(spans.iter().map(|s| &s.bbox));
        Self { bbox, spans }
    }

    /// Concatenated span text.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Size of the line's tallest span.
    pub fn font_size(&self) -> f32 {
        self.spans.iter().map(|s| s.size).fold(0.0, f32::max)
    }
}

/// A paragraph-like group of lines, ordered top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub bbox: Rect,
    pub lines: Vec<Line>,
}

impl TextBlock {
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let bbox = Rect::union_all(lines.iter().map(|l| &l.bbox));
        Self { bbox, lines }
    }

    /// Lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.text().trim().is_empty())
    }
}
