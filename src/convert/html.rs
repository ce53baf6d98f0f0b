//! PDF to HTML converter implementation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::Document;
use crate::parser::{ParseOptions, PdfParser};
use crate::render::{to_html, PageSelection, RenderOptions};

use super::OutputTarget;

/// PDF to HTML converter.
///
/// Each call processes one file end to end; the converter holds no state
/// besides its options and can be reused.
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl HtmlConverter {
    /// Create a converter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Convert a PDF file and write the HTML to `target`.
    ///
    /// A missing input yields [`Error::FileNotFound`] before anything is
    /// created. The document is rendered in memory, then parent directories
    /// of the output are created and the file is written. Returns the path
    /// written.
    pub fn convert_file<P: AsRef<Path>>(&self, pdf: P, target: OutputTarget) -> Result<PathBuf> {
        let pdf = pdf.as_ref();
        if !pdf.is_file() {
            return Err(Error::FileNotFound(pdf.to_path_buf()));
        }

        let html = self.convert_to_string(pdf)?;
        let output = target.resolve(pdf);
        write_output(&output, &html)?;

        log::info!("Converted {} to {}", pdf.display(), output.display());
        Ok(output)
    }

    /// Convert a PDF file to an HTML string.
    pub fn convert_to_string<P: AsRef<Path>>(&self, pdf: P) -> Result<String> {
        let doc = self.parse(pdf)?;
        to_html(&doc, &self.render_options)
    }

    /// Convert PDF bytes to an HTML string with the given title.
    pub fn convert_bytes(&self, data: &[u8], title: &str) -> Result<String> {
        let doc = PdfParser::from_bytes_with_options(data, self.effective_parse_options())?
            .with_title(title)
            .parse()?;
        to_html(&doc, &self.render_options)
    }

    /// Parse a PDF file with the options this converter renders with.
    pub fn parse<P: AsRef<Path>>(&self, pdf: P) -> Result<Document> {
        PdfParser::open_with_options(pdf, self.effective_parse_options())?.parse()
    }

    /// Parse options narrowed to what the render options will use.
    fn effective_parse_options(&self) -> ParseOptions {
        let mut options = self.parse_options.clone();

        if matches!(options.pages, PageSelection::All) {
            options.pages = self.render_options.page_selection.clone();
        }
        if !self.render_options.include_images {
            options.extract_images = false;
        }
        if !self.render_options.include_drawings {
            options.extract_drawings = false;
        }

        options
    }
}

/// Create missing parent directories and write `html`.
fn write_output(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }
    fs::write(path, html).map_err(|e| Error::write(path, e))
}
