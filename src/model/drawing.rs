//! Vector path records.

use serde::{Deserialize, Serialize};

use super::{Color, Rect};

/// A painted path, reduced to its bounds and paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRef {
    pub bbox: Rect,
    /// Stroke color, if the path was stroked
    pub stroke_color: Option<Color>,
    /// Fill color, if the path was filled
    pub fill_color: Option<Color>,
    /// Line width in page units
    pub width: f32,
}

impl DrawingRef {
    pub fn is_stroked(&self) -> bool {
        self.stroke_color.is_some()
    }

    pub fn is_filled(&self) -> bool {
        self.fill_color.is_some()
    }
}
