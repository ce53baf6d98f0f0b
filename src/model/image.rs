//! Extracted image records.

use serde::{Deserialize, Serialize};

use super::Rect;

/// Encoded format of an image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Samples re-encoded as PNG
    Png,
    /// DCT stream passed through unchanged
    Jpeg,
    /// JPEG 2000 stream passed through unchanged
    Jp2,
}

impl ImageFormat {
    /// Subtype used in `data:image/...` URIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Jp2 => "jp2",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Jp2 => "image/jp2",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image found on a page, with its encoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Position in the page's image list
    pub index: usize,
    /// 0-based page index
    pub page: u32,
    pub format: ImageFormat,
    /// Base64 encoded payload
    pub data: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Where the image is drawn on the page
    pub rects: Vec<Rect>,
}

impl ImageRef {
    /// Inline `data:` URI for the payload.
    pub fn data_uri(&self) -> String {
        format!("data:image/{};base64,{}", self.format.as_str(), self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let img = ImageRef {
            index: 0,
            page: 0,
            format: ImageFormat::Png,
            data: "AAAA".to_string(),
            width: 1,
            height: 1,
            rects: vec![],
        };
        assert_eq!(img.data_uri(), "data:image/png;base64,AAAA");
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
    }
}
