//! Requirements document loading.
//!
//! Supported inputs are plain text, CSV and PDF, chosen by file extension
//! (case-insensitive). The output is one text blob ready for chunking.

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Page separator emitted by the PDF text extractor.
const PAGE_BREAK: char = '\x0C';

/// Separator between the fields of one CSV row.
const CSV_FIELD_SEPARATOR: &str = " | ";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Text file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to extract PDF text: {0}")]
    Pdf(String),
}

/// Document formats accepted by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementFormat {
    Text,
    Csv,
    Pdf,
}

impl RequirementFormat {
    pub fn from_filename(filename: &str) -> Result<Self, LoaderError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            _ => Err(LoaderError::UnsupportedFormat(filename.to_string())),
        }
    }
}

/// Load the requirements text of the file at `path`.
pub fn load_requirements(path: impl AsRef<Path>) -> Result<String, LoaderError> {
    let path = path.as_ref();
    let filename = path.to_string_lossy();
    // Format check happens before the file is touched.
    RequirementFormat::from_filename(&filename)?;

    let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
        path: filename.to_string(),
        source,
    })?;
    load_bytes(&filename, &bytes)
}

/// Load requirements text from uploaded bytes, using `filename` for the format.
pub fn load_bytes(filename: &str, bytes: &[u8]) -> Result<String, LoaderError> {
    let format = RequirementFormat::from_filename(filename)?;
    debug!(filename, ?format, size = bytes.len(), "loading requirements");

    match format {
        RequirementFormat::Text => Ok(String::from_utf8(bytes.to_vec())?),
        RequirementFormat::Csv => csv_text(bytes),
        RequirementFormat::Pdf => pdf_text(bytes),
    }
}

/// Data rows of a CSV document. The header row is consumed, not emitted.
fn csv_text(bytes: &[u8]) -> Result<String, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().collect::<Vec<_>>().join(CSV_FIELD_SEPARATOR));
    }
    Ok(rows.join("\n"))
}

fn pdf_text(bytes: &[u8]) -> Result<String, LoaderError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| LoaderError::Pdf(e.to_string()))?;
    let pages: Vec<&str> = text.split(PAGE_BREAK).collect();
    debug!(pages = pages.len(), "extracted PDF text");
    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_passthrough() {
        let text = load_bytes("reqs.txt", "Billing:\nSend invoices".as_bytes()).unwrap();
        assert_eq!(text, "Billing:\nSend invoices");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(load_bytes("REQS.TXT", b"x").unwrap(), "x");
        assert_eq!(
            RequirementFormat::from_filename("a/b/Requirements.Pdf").unwrap(),
            RequirementFormat::Pdf
        );
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let err = load_bytes("reqs.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, LoaderError::Utf8(_)));
    }

    #[test]
    fn test_csv_header_skipped_and_fields_joined() {
        let csv = "id,requirement,priority\n1,Send invoices,high\n2,\"Refunds, partial\",low\n";
        let text = load_bytes("reqs.csv", csv.as_bytes()).unwrap();
        assert_eq!(text, "1 | Send invoices | high\n2 | Refunds, partial | low");
    }

    #[test]
    fn test_csv_header_only_is_empty() {
        assert_eq!(load_bytes("reqs.csv", b"id,requirement\n").unwrap(), "");
    }

    #[test]
    fn test_unsupported_format_rejected() {
        for name in ["reqs.docx", "reqs", "reqs.md"] {
            let err = load_bytes(name, b"anything").unwrap_err();
            assert!(matches!(err, LoaderError::UnsupportedFormat(_)), "{name}");
        }
    }

    #[test]
    fn test_corrupt_pdf_is_error() {
        let err = load_bytes("reqs.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, LoaderError::Pdf(_)));
    }
}
