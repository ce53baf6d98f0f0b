//! PDF document parser using lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::{detect_header_from_bytes, detect_header_from_path};
use crate::error::{Error, Result};
use crate::model::{Document, Metadata, PageContent};

use super::content::{deref, get_number, resolve_dict, stream_data, ContentScanner, PageSpace, ScannedPage};
use super::images::ImageExtractor;
use super::layout;
use super::options::{ErrorMode, ParseOptions};

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Title used for documents that were not loaded from a named file.
const DEFAULT_TITLE: &str = "document";

/// Inherited page attributes are looked up at most this many levels up.
const MAX_INHERIT_DEPTH: usize = 32;

/// PDF document parser.
pub struct PdfParser {
    doc: LopdfDocument,
    options: ParseOptions,
    title: String,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    ///
    /// The document title defaults to the file stem.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a PDF
        detect_header_from_path(path)?;

        let doc = LopdfDocument::load(path)?;
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        log::debug!("Loaded {} (PDF {})", path.display(), doc.version);
        Ok(Self { doc, options, title })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        detect_header_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;

        Ok(Self {
            doc,
            options,
            title: DEFAULT_TITLE.to_string(),
        })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Override the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Parse the document into pages of text blocks, images and drawings.
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new(self.title.clone());
        document.metadata = self.extract_metadata();

        let page_ids = self.doc.get_pages();
        let total_pages = page_ids.len() as u32;
        document.metadata.page_count = total_pages;

        for (page_num, page_id) in page_ids {
            if !self.options.pages.includes(page_num) {
                continue;
            }

            let page = self.parse_page(page_num - 1, page_id)?;
            document.add_page(page);
        }

        log::debug!(
            "Parsed {} of {} pages ({} images)",
            document.page_count(),
            total_pages,
            document.image_count()
        );
        Ok(document)
    }

    /// Extract document metadata.
    fn extract_metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.doc.version.to_string());

        let info_dict = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|info| resolve_dict(&self.doc, info));

        if let Some(info_dict) = info_dict {
            metadata.title = get_string_from_dict(info_dict, b"Title");
            metadata.author = get_string_from_dict(info_dict, b"Author");
            metadata.subject = get_string_from_dict(info_dict, b"Subject");
            metadata.keywords = get_string_from_dict(info_dict, b"Keywords");
            metadata.creator = get_string_from_dict(info_dict, b"Creator");
            metadata.producer = get_string_from_dict(info_dict, b"Producer");

            if let Some(date_str) = get_string_from_dict(info_dict, b"CreationDate") {
                metadata.created = parse_pdf_date(&date_str);
            }
            if let Some(date_str) = get_string_from_dict(info_dict, b"ModDate") {
                metadata.modified = parse_pdf_date(&date_str);
            }
        }

        metadata.encrypted = self.doc.is_encrypted();
        metadata
    }

    /// Parse a single page (0-based index).
    fn parse_page(&self, index: u32, page_id: ObjectId) -> Result<PageContent> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let media_box = self.media_box(page_dict);
        let mut page = PageContent::new(
            index,
            (media_box[2] - media_box[0]).abs(),
            (media_box[3] - media_box[1]).abs(),
        );

        let resources = self
            .inherited(page_dict, b"Resources")
            .and_then(|r| resolve_dict(&self.doc, r));

        let scanned = match self.scan_page(page_dict, resources, media_box) {
            Ok(scanned) => scanned,
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("Failed to extract content from page {}: {}", index + 1, e);
                ScannedPage::default()
            }
            Err(e) => return Err(e),
        };

        if self.options.extract_images {
            page.images = ImageExtractor::new(&self.doc).extract_page_images(index, resources, &scanned);
        }
        if self.options.extract_drawings {
            page.drawings = scanned.drawings;
        }
        page.text_blocks = layout::group_into_blocks(scanned.spans);

        Ok(page)
    }

    fn scan_page<'a>(
        &'a self,
        page_dict: &'a Dictionary,
        resources: Option<&'a Dictionary>,
        media_box: [f32; 4],
    ) -> Result<ScannedPage> {
        let content = self.page_content(page_dict)?;
        ContentScanner::new(&self.doc, PageSpace::from_media_box(media_box))
            .with_drawings(self.options.extract_drawings)
            .scan(&content, resources)
    }

    /// Concatenated, decoded content streams of a page.
    fn page_content(&self, page_dict: &Dictionary) -> Result<Vec<u8>> {
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match deref(&self.doc, contents) {
            Object::Stream(s) => stream_data(s),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = deref(&self.doc, obj) {
                        content.extend_from_slice(&stream_data(s)?);
                        content.push(b'\n');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// MediaBox, inherited from ancestor page tree nodes when absent.
    fn media_box(&self, page_dict: &Dictionary) -> [f32; 4] {
        let values: Option<Vec<f32>> = self
            .inherited(page_dict, b"MediaBox")
            .and_then(|obj| deref(&self.doc, obj).as_array().ok())
            .map(|arr| arr.iter().filter_map(|o| get_number(deref(&self.doc, o))).collect());

        match values.as_deref() {
            Some([x0, y0, x1, y1, ..]) if (x1 - x0).abs() > 0.0 && (y1 - y0).abs() > 0.0 => [*x0, *y0, *x1, *y1],
            _ => DEFAULT_MEDIA_BOX,
        }
    }

    /// Look up a page attribute, walking `/Parent` links.
    fn inherited<'a>(&'a self, page_dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut dict = page_dict;
        for _ in 0..MAX_INHERIT_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            dict = dict.get(b"Parent").ok().and_then(|p| resolve_dict(&self.doc, p))?;
        }
        None
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Document metadata without parsing any page.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = self.extract_metadata();
        metadata.page_count = self.page_count();
        metadata
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    })
}

/// Decode a text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    let naive = chrono::NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;

    // Timezone offset: Z, +HH'mm' or -HH'mm'
    let offset_minutes = match s.get(14..15) {
        Some(sign @ ("+" | "-")) => {
            let hours: i64 = s.get(15..17).and_then(|h| h.parse().ok()).unwrap_or(0);
            let minutes: i64 = s.get(18..20).and_then(|m| m.parse().ok()).unwrap_or(0);
            let total = hours * 60 + minutes;
            if sign == "-" {
                -total
            } else {
                total
            }
        }
        _ => 0,
    };

    let utc = naive - chrono::Duration::minutes(offset_minutes);
    Some(chrono::DateTime::from_naive_utc_and_offset(utc, chrono::Utc))
}
