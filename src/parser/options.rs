//! Parsing options and configuration.

use crate::render::PageSelection;

/// Options for extracting page content from a PDF.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode for per-page text extraction
    pub error_mode: ErrorMode,

    /// Whether to extract embedded images
    pub extract_images: bool,

    /// Whether to record painted vector paths
    pub extract_drawings: bool,

    /// Page selection (which pages to parse, 1-indexed)
    pub pages: PageSelection,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (a page whose content cannot be scanned is kept empty).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable drawing extraction.
    pub fn with_drawings(mut self, extract: bool) -> Self {
        self.extract_drawings = extract;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            extract_images: true,
            extract_drawings: true,
            pages: PageSelection::All,
        }
    }
}

/// Error handling mode during parsing.
///
/// Image failures are always skipped with a warning regardless of the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any content error
    #[default]
    Strict,
    /// Log the failing page and continue with it empty
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .lenient()
            .with_images(false)
            .with_drawings(false)
            .with_pages(PageSelection::Pages(vec![2]));

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(!options.extract_images);
        assert!(!options.extract_drawings);
        assert!(!options.pages.includes(1));
        assert!(options.pages.includes(2));
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.extract_images);
        assert!(options.extract_drawings);
    }
}
