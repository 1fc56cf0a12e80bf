//! # Text Extraction
//!
//! Turns an uploaded `.txt` or `.pdf` file into plain text for the pipeline.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No file uploaded.")]
    MissingFile,

    #[error("Unsupported file type '{extension}'. Allowed: {allowed}")]
    UnsupportedType { extension: String, allowed: String },

    #[error("The uploaded text file is not valid UTF-8.")]
    InvalidUtf8,

    #[error("Could not read the PDF: {0}")]
    Pdf(String),
}

/// Lowercased extension with leading dot, or "" when there is none
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{}", ext.to_ascii_lowercase()),
        _ => String::new(),
    }
}

/// Decide how to read an upload from its name
pub fn document_kind(filename: &str, allowed: &[String]) -> Result<DocumentKind, ExtractError> {
    if filename.trim().is_empty() {
        return Err(ExtractError::MissingFile);
    }
    let extension = file_extension(filename);
    let kind = match extension.as_str() {
        ".txt" => Some(DocumentKind::Text),
        ".pdf" => Some(DocumentKind::Pdf),
        _ => None,
    };
    match kind {
        Some(kind) if allowed.iter().any(|a| *a == extension) => Ok(kind),
        _ => Err(ExtractError::UnsupportedType {
            extension,
            allowed: allowed.join(", "),
        }),
    }
}

/// Extract text. PDF parsing is CPU bound; call from a blocking task.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Text => {
            let text = std::str::from_utf8(bytes).map_err(|_| ExtractError::InvalidUtf8)?;
            Ok(text.trim_start_matches('\u{feff}').to_string())
        }
        DocumentKind::Pdf => {
            let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
                .map_err(|e| ExtractError::Pdf(e.to_string()))?;
            Ok(pages.join("\n").trim().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec![".txt".to_string(), ".pdf".to_string()]
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.TXT"), ".txt");
        assert_eq!(file_extension("scan.final.Pdf"), ".pdf");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension("trailing."), "");
    }

    #[test]
    fn test_document_kind() {
        assert_eq!(document_kind("a.txt", &allowed()).unwrap(), DocumentKind::Text);
        assert_eq!(document_kind("A.PDF", &allowed()).unwrap(), DocumentKind::Pdf);
        assert!(matches!(
            document_kind("", &allowed()),
            Err(ExtractError::MissingFile)
        ));

        let err = document_kind("photo.jpg", &allowed()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file type '.jpg'. Allowed: .txt, .pdf"
        );
    }

    #[test]
    fn test_disallowed_known_kind() {
        let only_txt = vec![".txt".to_string()];
        assert!(matches!(
            document_kind("scan.pdf", &only_txt),
            Err(ExtractError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_extract_plain_text() {
        let text = extract_text(DocumentKind::Text, "\u{feff}BP 180/110".as_bytes()).unwrap();
        assert_eq!(text, "BP 180/110");
        assert!(matches!(
            extract_text(DocumentKind::Text, &[0xff, 0xfe, 0x00]),
            Err(ExtractError::InvalidUtf8)
        ));
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        assert!(matches!(
            extract_text(DocumentKind::Pdf, b"not a pdf at all"),
            Err(ExtractError::Pdf(_))
        ));
    }
}
