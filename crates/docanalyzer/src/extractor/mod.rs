pub mod docx;
pub mod pdf;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DocumentFormat;
use crate::error::ExtractError;

/// Plain text recovered from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    /// Page count, for formats that have pages.
    pub pages: Option<usize>,
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(pdf::PdfExtractor::new()),
                Box::new(docx::DocxExtractor::new()),
            ],
        }
    }

    /// A registry with a caller-chosen set of extractors.
    pub fn with_extractors(extractors: Vec<Box<dyn TextExtractor>>) -> Self {
        Self { extractors }
    }

    pub fn extract(
        &self,
        format: DocumentFormat,
        bytes: &[u8],
    ) -> Result<ExtractedText, ExtractError> {
        for extractor in &self.extractors {
            if extractor.supports(format) {
                return extractor.extract(bytes);
            }
        }

        Err(ExtractError::Unavailable {
            format,
            reason: "no extractor registered".to_string(),
        })
    }

    pub fn extract_file(
        &self,
        path: &Path,
        format: DocumentFormat,
    ) -> Result<ExtractedText, ExtractError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.extract(format, &bytes)
    }

    /// Runs [`extract_file`](Self::extract_file) on the blocking thread pool.
    pub async fn extract_file_blocking(
        self: Arc<Self>,
        path: PathBuf,
        format: DocumentFormat,
    ) -> Result<ExtractedText, ExtractError> {
        tokio::task::spawn_blocking(move || self.extract_file(&path, format))
            .await
            .map_err(|e| ExtractError::Unavailable {
                format,
                reason: format!("extraction task did not complete: {}", e),
            })?
    }

    /// Runs [`extract`](Self::extract) over an in-memory buffer on the
    /// blocking thread pool.
    pub async fn extract_bytes_blocking(
        self: Arc<Self>,
        format: DocumentFormat,
        bytes: Vec<u8>,
    ) -> Result<ExtractedText, ExtractError> {
        tokio::task::spawn_blocking(move || self.extract(format, &bytes))
            .await
            .map_err(|e| ExtractError::Unavailable {
                format,
                reason: format!("extraction task did not complete: {}", e),
            })?
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_without_extractor_is_unavailable() {
        let registry = ExtractorRegistry::with_extractors(vec![Box::new(pdf::PdfExtractor::new())]);

        let result = registry.extract(DocumentFormat::Docx, b"PK");
        match result {
            Err(ExtractError::Unavailable { format, .. }) => {
                assert_eq!(format, DocumentFormat::Docx)
            }
            other => panic!("Expected Unavailable error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_file_not_found() {
        let registry = ExtractorRegistry::new();
        let result = registry.extract_file(Path::new("/nonexistent/file.pdf"), DocumentFormat::Pdf);

        match result {
            Err(ExtractError::ReadDocument { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/file.pdf"));
            }
            other => panic!("Expected ReadDocument error, got {:?}", other),
        }
    }

    #[test]
    fn test_registry_routes_by_format() {
        let registry = ExtractorRegistry::new();

        // Garbage routed to the PDF extractor surfaces as a corrupt PDF.
        match registry.extract(DocumentFormat::Pdf, b"not a pdf") {
            Err(ExtractError::Corrupt { format, .. }) => assert_eq!(format, DocumentFormat::Pdf),
            other => panic!("Expected Corrupt error, got {:?}", other),
        }

        match registry.extract(DocumentFormat::Docx, b"not a zip") {
            Err(ExtractError::Corrupt { format, .. }) => assert_eq!(format, DocumentFormat::Docx),
            other => panic!("Expected Corrupt error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_bytes_blocking_propagates_errors() {
        let registry = Arc::new(ExtractorRegistry::new());
        let result = registry
            .extract_bytes_blocking(DocumentFormat::Pdf, b"garbage".to_vec())
            .await;
        assert!(matches!(result, Err(ExtractError::Corrupt { .. })));
    }
}
