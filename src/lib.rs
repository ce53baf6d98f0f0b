//! # pdf2html
//!
//! Convert PDF documents into self-contained HTML files.
//!
//! Pages are scanned with `lopdf` into positioned text spans, images and
//! vector paths, grouped into lines and blocks, and rendered as a single HTML
//! document with images inlined as base64 data URIs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf2html::{parse_file, render};
//!
//! fn main() -> pdf2html::Result<()> {
//!     // Parse a PDF file
//!     let doc = parse_file("document.pdf")?;
//!
//!     // Render as HTML
//!     let options = render::RenderOptions::default();
//!     let html = render::to_html(&doc, &options)?;
//!     std::fs::write("document.html", html)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Styled or plain templates**: per-span bold/italic/size/color, or a
//!   minimal `<pre>` layout
//! - **Inline images**: JPEG passthrough, other images re-encoded as PNG
//! - **Intermediate form**: the parsed document dumps to JSON or plain text

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{HtmlConverter, OutputTarget};
pub use detect::{detect_header_from_bytes, detect_header_from_path, is_pdf_bytes, PdfHeader};
pub use error::{Error, Result};
pub use model::{
    Color, Document, DrawingRef, ImageFormat, ImageRef, Line, Metadata, PageContent, Rect, Span,
    TextBlock,
};
pub use parser::{ErrorMode, ParseOptions, PdfParser};
pub use render::{HtmlTemplate, JsonFormat, PageSelection, RenderOptions};

use std::io::Read;
use std::path::{Path, PathBuf};

/// Parse a PDF file and return a structured document.
///
/// # Example
///
/// ```no_run
/// use pdf2html::parse_file;
///
/// let doc = parse_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Parse a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf2html::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().with_images(false);
/// let doc = parse_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = PdfParser::from_reader(reader)?;
    parser.parse()
}

/// Convert a PDF file to an HTML string with default options.
///
/// # Example
///
/// ```no_run
/// let html = pdf2html::to_html("document.pdf").unwrap();
/// std::fs::write("document.html", html).unwrap();
/// ```
pub fn to_html<P: AsRef<Path>>(path: P) -> Result<String> {
    HtmlConverter::new().convert_to_string(path)
}

/// Convert a PDF file to an HTML string with custom render options.
pub fn to_html_with_options<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    HtmlConverter::new()
        .with_render_options(options.clone())
        .convert_to_string(path)
}

/// Convert a PDF file and write the HTML to disk.
///
/// `output` is the HTML file to write; `None` writes `<stem>.html` in the
/// current directory. Returns the path written.
///
/// # Example
///
/// ```no_run
/// let written = pdf2html::convert_file("report.pdf", None).unwrap();
/// assert_eq!(written, std::path::PathBuf::from("report.html"));
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, output: Option<PathBuf>) -> Result<PathBuf> {
    HtmlConverter::new().convert_file(path, OutputTarget::from(output))
}

/// Convert a PDF file to JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Extract plain text from a PDF file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file_with_options(path, ParseOptions::new().with_images(false).with_drawings(false))?;
    Ok(doc.plain_text())
}

/// Builder for parsing and converting PDF documents.
///
/// # Example
///
/// ```no_run
/// use pdf2html::Pdf2Html;
///
/// let html = Pdf2Html::new()
///     .plain()
///     .lenient()
///     .parse("document.pdf")?
///     .to_html()?;
/// # Ok::<(), pdf2html::Error>(())
/// ```
pub struct Pdf2Html {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Pdf2Html {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Use the plain template.
    pub fn plain(mut self) -> Self {
        self.render_options = self.render_options.plain();
        self
    }

    /// Enable or disable images, in both extraction and output.
    pub fn with_images(mut self, include: bool) -> Self {
        self.parse_options = self.parse_options.with_images(include);
        self.render_options = self.render_options.with_images(include);
        self
    }

    /// Enable or disable drawing elements in the output.
    pub fn with_drawings(mut self, include: bool) -> Self {
        self.parse_options = self.parse_options.with_drawings(include);
        self.render_options = self.render_options.with_drawings(include);
        self
    }

    /// Override the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_title(title);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages.clone());
        self.render_options = self.render_options.with_pages(pages);
        self
    }

    /// Parse a PDF file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<Pdf2HtmlResult> {
        let parser = PdfParser::open_with_options(path, self.parse_options)?;
        let document = parser.parse()?;
        Ok(Pdf2HtmlResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Parse a PDF from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<Pdf2HtmlResult> {
        let parser = PdfParser::from_bytes_with_options(data, self.parse_options)?;
        let document = parser.parse()?;
        Ok(Pdf2HtmlResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Parse and write HTML to `target`.
    pub fn convert<P: AsRef<Path>>(self, path: P, target: OutputTarget) -> Result<PathBuf> {
        HtmlConverter::new()
            .with_parse_options(self.parse_options)
            .with_render_options(self.render_options)
            .convert_file(path, target)
    }
}

impl Default for Pdf2Html {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a PDF document.
pub struct Pdf2HtmlResult {
    /// The parsed document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl Pdf2HtmlResult {
    /// Render as HTML.
    pub fn to_html(&self) -> Result<String> {
        render::to_html(&self.document, &self.render_options)
    }

    /// Render as plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
