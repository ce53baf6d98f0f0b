//! Rendering options and configuration.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Upper bound on the pages a comma-separated selection may list.
const MAX_LISTED_PAGES: u64 = 100_000;

/// Options for rendering a document as HTML.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Page layout and stylesheet
    pub template: HtmlTemplate,

    /// Title for `<title>` and the heading; defaults to the document title
    pub title: Option<String>,

    /// Page selection
    pub page_selection: PageSelection,

    /// Embed extracted images as data URIs
    pub include_images: bool,

    /// Emit painted paths as positioned `div.drawing-element`s
    pub include_drawings: bool,

    /// Emit `<meta>` tags for document metadata
    pub include_metadata: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template.
    pub fn with_template(mut self, template: HtmlTemplate) -> Self {
        self.template = template;
        self
    }

    /// Use the plain template.
    pub fn plain(mut self) -> Self {
        self.template = HtmlTemplate::Plain;
        self
    }

    /// Override the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.page_selection = PageSelection::Range(range);
        self
    }

    /// Enable or disable embedded images.
    pub fn with_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    /// Enable or disable drawing elements.
    pub fn with_drawings(mut self, include: bool) -> Self {
        self.include_drawings = include;
        self
    }

    /// Enable or disable metadata `<meta>` tags.
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            template: HtmlTemplate::Styled,
            title: None,
            page_selection: PageSelection::All,
            include_images: true,
            include_drawings: false,
            include_metadata: true,
        }
    }
}

/// HTML page layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtmlTemplate {
    /// Styled pages with per-span formatting and a title banner
    #[default]
    Styled,
    /// Minimal stylesheet with each page's text in a `<pre>` block
    Plain,
}

/// Page selection for parsing and rendering.
#[derive(Debug, Clone, Default)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());
        let page_number = |part: &str| -> Result<u32> {
            match part.trim().parse::<u32>() {
                Ok(p) if p > 0 => Ok(p),
                _ => Err(invalid()),
            }
        };

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !s.contains(',') {
                let (start, end) = (page_number(start)?, page_number(end)?);
                if start > end {
                    return Err(invalid());
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        // Comma-separated list with possible ranges
        let mut pages = BTreeSet::new();
        for part in s.split(',') {
            let (start, end) = match part.split_once('-') {
                Some((start, end)) => (page_number(start)?, page_number(end)?),
                None => {
                    let p = page_number(part)?;
                    (p, p)
                }
            };
            if start > end {
                return Err(invalid());
            }
            if pages.len() as u64 + u64::from(end - start) >= MAX_LISTED_PAGES {
                return Err(invalid());
            }
            pages.extend(start..=end);
        }

        Ok(PageSelection::Pages(pages.into_iter().collect()))
    }
}
