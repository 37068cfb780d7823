//! Builders for creating test fixtures programmatically.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use lopdf::{dictionary, Document, Object, Stream};
use zip::write::SimpleFileOptions;

use docanalyzer::config::{ChecklistConfig, Config, QuestionConfig};

/// Builds PDF bytes with one page per entry. `None` yields a page without
/// a content stream.
pub struct PdfBuilder {
    pages: Vec<Option<String>>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    pub fn page(mut self, text: &str) -> Self {
        self.pages.push(Some(text.to_string()));
        self
    }

    pub fn blank_page(mut self) -> Self {
        self.pages.push(None);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for page in &self.pages {
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
            };
            if let Some(text) = page {
                let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
                page_dict.set("Contents", content_id);
            }
            kids.push(Object::from(doc.add_object(page_dict)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("Failed to serialize PDF");
        bytes
    }
}

/// Builds a minimal DOCX archive with one `w:p` per paragraph.
pub struct DocxBuilder {
    paragraphs: Vec<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            paragraphs: Vec::new(),
        }
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.push(text.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let body: String = self
            .paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file("word/document.xml", SimpleFileOptions::default())
                .expect("Failed to start DOCX entry");
            writer
                .write_all(xml.as_bytes())
                .expect("Failed to write DOCX entry");
            writer.finish().expect("Failed to finish DOCX");
        }
        buffer.into_inner()
    }
}

/// Builder for `Config` instances.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.inference.base_url = url.to_string();
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.config.inference.model = model.to_string();
        self
    }

    pub fn questions(mut self, questions: &[(u32, &str)]) -> Self {
        self.config.checklist = ChecklistConfig {
            questions: questions
                .iter()
                .map(|(id, text)| QuestionConfig {
                    id: *id,
                    text: text.to_string(),
                })
                .collect(),
            max_files_per_question: self.config.checklist.max_files_per_question,
        };
        self
    }

    pub fn max_files_per_question(mut self, max: usize) -> Self {
        self.config.checklist.max_files_per_question = max;
        self
    }

    pub fn export_directory(mut self, dir: &str) -> Self {
        self.config.export.directory = Some(dir.to_string());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
