use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DocumentFormat;
use crate::error::ValidationError;

/// A document admitted for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputItem {
    pub id: String,
    pub path: PathBuf,
    /// Display name (the file name).
    pub name: String,
    pub size: u64,
    pub format: DocumentFormat,
    pub mime_type: String,
}

impl InputItem {
    /// Validates a file on disk and builds an item for it.
    ///
    /// The format comes from `declared_mime` when it names PDF or DOCX,
    /// otherwise from the file extension. Anything else is rejected.
    pub fn from_path(path: &Path, declared_mime: Option<&str>) -> Result<Self, ValidationError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let format = DocumentFormat::detect(&name, declared_mime)
            .ok_or_else(|| ValidationError::UnsupportedFileType { name: name.clone() })?;

        let metadata = std::fs::metadata(path).map_err(|e| ValidationError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mime_type = declared_mime
            .filter(|m| DocumentFormat::from_mime_type(m) == Some(format))
            .map(str::to_string)
            .or_else(|| Self::detect_mime_type(path))
            .unwrap_or_else(|| format.mime_type().to_string());

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            format,
            mime_type,
        })
    }

    fn detect_mime_type(path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|m| m.to_string())
    }
}

/// A checklist question with the documents offered as evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub context: Option<String>,
    pub files: Vec<InputItem>,
    /// Outcome of the latest analysis, `None` until analyzed.
    pub confirmed: Option<bool>,
}

impl Question {
    pub fn new(id: u32, text: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
            context: None,
            files: Vec::new(),
            confirmed: None,
        }
    }

    /// Key of this question on the status board.
    pub fn unit_key(&self) -> String {
        question_key(self.id)
    }

    pub fn label(&self) -> String {
        format!("Question {}", self.id)
    }
}

pub fn question_key(id: u32) -> String {
    format!("question-{}", id)
}

/// What an analysis result was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultSource {
    Document { item_id: String, name: String },
    Question { id: u32, text: String },
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultSource::Document { name, .. } => write!(f, "Document: {}", name),
            ResultSource::Question { id, text } => write!(f, "Question {}: {}", id, text),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub source: ResultSource,
    pub analysis: String,
    /// Set in checklist mode only.
    pub confirmed: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(source: ResultSource, analysis: String, confirmed: Option<bool>) -> Self {
        Self {
            source,
            analysis,
            confirmed,
            created_at: Utc::now(),
        }
    }
}
