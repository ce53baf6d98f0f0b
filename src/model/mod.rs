//! Intermediate page records built by the parser and consumed by renderers.
//!
//! Records are produced once per conversion and are read-only afterwards.
//! Coordinates are in points with the origin at the top-left corner of the
//! page and y growing downward.

mod document;
mod drawing;
mod geometry;
mod image;
mod page;
mod text;

pub use document::{Document, Metadata};
pub use drawing::DrawingRef;
pub use geometry::{Color, Rect};
pub use image::{ImageFormat, ImageRef};
pub use page::PageContent;
pub use text::{Line, Span, TextBlock, DEFAULT_FONT_SIZE};
