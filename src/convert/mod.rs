//! Conversion front door: parse a PDF, render HTML and write it to disk.
//!
//! # Example
//!
//! ```no_run
//! use pdf2html::convert::{HtmlConverter, OutputTarget};
//!
//! fn main() -> pdf2html::Result<()> {
//!     let converter = HtmlConverter::new();
//!     let written = converter.convert_file("report.pdf", OutputTarget::Dir("output".into()))?;
//!     println!("wrote {}", written.display());
//!     Ok(())
//! }
//! ```

mod html;

pub use html::HtmlConverter;

use std::path::{Path, PathBuf};

/// Where a converted document is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// `<stem>.html` in the current directory
    #[default]
    Default,
    /// `<dir>/<stem>.html`
    Dir(PathBuf),
    /// An explicit output file
    File(PathBuf),
}

impl OutputTarget {
    /// Output path for the given input PDF.
    pub fn resolve(&self, pdf: &Path) -> PathBuf {
        match self {
            OutputTarget::File(path) => path.clone(),
            OutputTarget::Dir(dir) => dir.join(html_file_name(pdf)),
            OutputTarget::Default => PathBuf::from(html_file_name(pdf)),
        }
    }
}

impl From<Option<PathBuf>> for OutputTarget {
    fn from(path: Option<PathBuf>) -> Self {
        path.map(OutputTarget::File).unwrap_or_default()
    }
}

/// `<stem>.html` for an input path.
fn html_file_name(pdf: &Path) -> String {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    format!("{}.html", stem)
}
