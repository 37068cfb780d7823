use std::io::{Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::config::DocumentFormat;
use crate::error::ExtractError;
use crate::extractor::{ExtractedText, TextExtractor};

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        let _span = tracing::info_span!("processor.docx", bytes = bytes.len()).entered();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| corrupt(format!("Failed to open DOCX: {}", e)))?;

        let xml_content = read_document_xml(&mut archive)?;
        let text = parse_docx_xml(&xml_content)?;

        if text.is_empty() {
            return Err(ExtractError::NoText {
                format: DocumentFormat::Docx,
            });
        }

        tracing::debug!(chars = text.len(), "Extracted DOCX text");

        Ok(ExtractedText { text, pages: None })
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Docx)
    }
}

fn corrupt(reason: String) -> ExtractError {
    ExtractError::Corrupt {
        format: DocumentFormat::Docx,
        reason,
    }
}

fn read_document_xml<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, ExtractError> {
    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| corrupt(format!("Failed to find document.xml: {}", e)))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| corrupt(format!("Failed to read document.xml: {}", e)))?;

    Ok(xml_content)
}

/// Collects `w:t` runs per paragraph. Paragraphs are separated by a blank
/// line; `w:tab` becomes a tab and `w:br`/`w:cr` a newline. Paragraphs nested
/// in text boxes are emitted before the paragraph that contains them.
fn parse_docx_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = true,
                b"p" => open.push(String::new()),
                b"tab" => push_str(&mut open, "\t"),
                b"br" | b"cr" => push_str(&mut open, "\n"),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => push_str(&mut open, "\t"),
                b"br" | b"cr" => push_str(&mut open, "\n"),
                b"p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_element => {
                let decoded = e
                    .decode()
                    .map_err(|e| corrupt(format!("Invalid text encoding: {}", e)))?;
                push_str(&mut open, &decoded);
            }
            Ok(Event::GeneralRef(r)) if in_text_element => {
                let resolved = r
                    .resolve_char_ref()
                    .map_err(|e| corrupt(format!("Invalid character reference: {}", e)))?;
                if let Some(ch) = resolved {
                    push_str(&mut open, ch.encode_utf8(&mut [0; 4]));
                } else {
                    let name = r
                        .decode()
                        .map_err(|e| corrupt(format!("Invalid entity reference: {}", e)))?;
                    match quick_xml::escape::resolve_predefined_entity(&name) {
                        Some(resolved) => push_str(&mut open, resolved),
                        None => {
                            tracing::debug!(entity = %name, "Skipping unknown entity reference")
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(corrupt(format!("XML parsing error: {}", e)));
            }
            _ => {}
        }
    }

    Ok(paragraphs.join("\n\n").trim().to_string())
}

/// Appends to the innermost open paragraph.
fn push_str(open: &mut [String], text: &str) {
    if let Some(current) = open.last_mut() {
        current.push_str(text);
    }
}
