//! Document-level types.

use super::PageContent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed PDF document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Title used for the HTML `<title>` and heading, usually the file stem
    pub title: String,

    /// Document metadata (author, dates, etc.)
    pub metadata: Metadata,

    /// Extracted pages, in source order
    pub pages: Vec<PageContent>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            metadata: Metadata::default(),
            pages: Vec::new(),
        }
    }

    /// Number of extracted pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn add_page(&mut self, page: PageContent) {
        self.pages.push(page);
    }

    /// Get a page by 0-based index.
    pub fn get_page(&self, index: u32) -> Option<&PageContent> {
        self.pages.get(index as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of images kept across all pages.
    pub fn image_count(&self) -> usize {
        self.pages.iter().map(|p| p.images.len()).sum()
    }

    /// Plain text of the whole document, pages separated by form feeds.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\x0c\n")
    }
}

/// Document metadata from the trailer `Info` dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,

    pub author: Option<String>,

    pub subject: Option<String>,

    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    pub created: Option<DateTime<Utc>>,

    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages in the source file
    pub page_count: u32,

    pub encrypted: bool,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }

    /// Name/content pairs suitable for HTML `<meta>` tags, skipping absent fields.
    pub fn html_meta_pairs(&self) -> Vec<(&'static str, &str)> {
        let fields = [
            ("author", &self.author),
            ("description", &self.subject),
            ("keywords", &self.keywords),
            ("generator", &self.producer),
        ];
        fields
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageContent;

    #[test]
    fn test_document_new() {
        let doc = Document::new("report");
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.title, "report");
    }

    #[test]
    fn test_get_page_by_index() {
        let mut doc = Document::new("a");
        doc.add_page(PageContent::letter(0));
        doc.add_page(PageContent::letter(1));
        assert_eq!(doc.get_page(1).map(|p| p.number()), Some(2));
        assert!(doc.get_page(2).is_none());
    }

    #[test]
    fn test_html_meta_pairs() {
        let mut metadata = Metadata::with_version("1.7");
        metadata.author = Some("Jane Roe".to_string());
        metadata.keywords = Some("pdf, html".to_string());

        let pairs = metadata.html_meta_pairs();
        assert_eq!(pairs, vec![("author", "Jane Roe"), ("keywords", "pdf, html")]);
    }
}
