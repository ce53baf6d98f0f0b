//! Error types for the pdf2html library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdf2html operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a PDF to HTML.
#[derive(Error, Debug)]
pub enum Error {
    /// The input PDF does not exist.
    #[error("PDF file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error when reading input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The output file could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        /// Output path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a malformed version.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF library failed on malformed or unsupported input.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Scanning a page's content stream failed.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// A single image could not be extracted.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error while producing output (JSON serialization).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Malformed `--pages` style page range.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),
}

impl Error {
    /// Wrap an I/O error raised while writing `path`.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::InvalidPageRange("5-2".to_string());
        assert_eq!(err.to_string(), "Invalid page range: 5-2");

        let err = Error::FileNotFound(PathBuf::from("pdf/a.pdf"));
        assert_eq!(err.to_string(), "PDF file not found: pdf/a.pdf");
    }

    #[test]
    fn test_write_error_keeps_path() {
        let err = Error::write(
            "out/a.html",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("Cannot write out/a.html"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
