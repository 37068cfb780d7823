use crate::config::DocumentFormat;
use crate::error::ExtractError;
use crate::extractor::{ExtractedText, TextExtractor};

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        let _span = tracing::info_span!("processor.pdf", bytes = bytes.len()).entered();

        let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Corrupt {
            format: DocumentFormat::Pdf,
            reason: e.to_string(),
        })?;

        let pages = doc.get_pages();
        let page_count = pages.len();

        let text = extract_page_blocks(&doc, pages.keys().copied());
        if text.is_empty() {
            return Err(ExtractError::NoText {
                format: DocumentFormat::Pdf,
            });
        }

        tracing::debug!(pages = page_count, chars = text.len(), "Extracted PDF text");

        Ok(ExtractedText {
            text,
            pages: Some(page_count),
        })
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Pdf)
    }
}

/// Emits `Page {n}:\n{text}` for every page that has text, blocks separated
/// by a blank line. Page numbers are ascending (`get_pages` is a BTreeMap).
fn extract_page_blocks(doc: &lopdf::Document, page_numbers: impl Iterator<Item = u32>) -> String {
    let mut blocks = Vec::new();

    for page_num in page_numbers {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                let page_text = page_text.trim();
                if !page_text.is_empty() {
                    blocks.push(format!("Page {}:\n{}", page_num, page_text));
                }
            }
            Err(e) => {
                tracing::debug!(page = page_num, error = %e, "Skipping unreadable PDF page");
            }
        }
    }

    blocks.join("\n\n").trim().to_string()
}
