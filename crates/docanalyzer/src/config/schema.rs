use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Compliance checklist used when no questions are configured.
pub const DEFAULT_QUESTIONS: [&str; 11] = [
    "Do you have a health and safety policy and procedures?",
    "Do you have access to competent health and safety advice?",
    "Do you provide health and safety training to your employees?",
    "Do you produce risk assessments and method statements (RAMS)?",
    "Do you record and investigate accidents and incidents?",
    "Are you aware of your duties under CDM 2015?",
    "Do you assess occupational health risks and provide welfare?",
    "How do you assess and manage subcontractors?",
    "How do you monitor and review your health and safety performance?",
    "Do you hold valid and adequate insurance (e.g., Employers' Liability)?",
    "Can you provide examples of your health and safety documentation?",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub checklist: ChecklistConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            inference: InferenceConfig::default(),
            checklist: ChecklistConfig::default(),
            export: ExportConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Connection and sampling settings for the local inference server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_top_k() -> u32 {
    40
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistConfig {
    #[serde(default = "default_questions")]
    pub questions: Vec<QuestionConfig>,
    #[serde(default = "default_max_files")]
    pub max_files_per_question: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionConfig {
    pub id: u32,
    pub text: String,
}

fn default_questions() -> Vec<QuestionConfig> {
    DEFAULT_QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, text)| QuestionConfig {
            id: index as u32 + 1,
            text: text.to_string(),
        })
        .collect()
}

fn default_max_files() -> usize {
    3
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            questions: default_questions(),
            max_files_per_question: default_max_files(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Target directory for export artifacts. Falls back to the user's
    /// download directory, then the working directory.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_document_prefix")]
    pub document_prefix: String,
    #[serde(default = "default_checklist_prefix")]
    pub checklist_prefix: String,
}

fn default_document_prefix() -> String {
    "document-analysis".to_string()
}

fn default_checklist_prefix() -> String {
    "health-safety-analysis".to_string()
}

impl ExportConfig {
    pub fn resolve_directory(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => PathBuf::from(dir),
            None => dirs::download_dir().unwrap_or_else(|| Path::new(".").to_path_buf()),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            document_prefix: default_document_prefix(),
            checklist_prefix: default_checklist_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit log lines as JSON objects.
    #[serde(default)]
    pub json: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
}

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(PDF_MIME_TYPE) {
            Some(Self::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME_TYPE) {
            Some(Self::Docx)
        } else {
            None
        }
    }

    /// Resolves the format from a declared MIME type first, then the file
    /// extension of `name`.
    pub fn detect(name: &str, declared_mime: Option<&str>) -> Option<Self> {
        declared_mime
            .and_then(Self::from_mime_type)
            .or_else(|| {
                Path::new(name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(Self::from_extension)
            })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME_TYPE,
            Self::Docx => DOCX_MIME_TYPE,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Docx => write!(f, "DOCX"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_pdf() {
        assert_eq!(
            DocumentFormat::from_extension("pdf"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_extension("PDF"),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn test_from_extension_docx() {
        assert_eq!(
            DocumentFormat::from_extension("docx"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_extension("DOCX"),
            Some(DocumentFormat::Docx)
        );
    }

    #[test]
    fn test_from_extension_rejects_other_formats() {
        assert_eq!(DocumentFormat::from_extension("doc"), None);
        assert_eq!(DocumentFormat::from_extension("exe"), None);
        assert_eq!(DocumentFormat::from_extension(""), None);
    }

    #[test]
    fn test_from_mime_type_ignores_parameters_and_case() {
        assert_eq!(
            DocumentFormat::from_mime_type("Application/PDF; charset=binary"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_mime_type(DOCX_MIME_TYPE),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_mime_type("text/plain"), None);
    }

    #[test]
    fn test_detect_prefers_declared_mime() {
        assert_eq!(
            DocumentFormat::detect("upload.bin", Some(PDF_MIME_TYPE)),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::detect("report.docx", Some("application/octet-stream")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::detect("report.exe", None), None);
    }

    #[test]
    fn test_default_checklist_matches_builtin_questions() {
        let checklist = ChecklistConfig::default();
        assert_eq!(checklist.questions.len(), DEFAULT_QUESTIONS.len());
        assert_eq!(checklist.questions[0].id, 1);
        assert_eq!(checklist.questions[10].id, 11);
        assert_eq!(checklist.max_files_per_question, 3);
    }

    #[test]
    fn test_export_directory_override() {
        let export = ExportConfig {
            directory: Some("/tmp/exports".to_string()),
            ..ExportConfig::default()
        };
        assert_eq!(export.resolve_directory(), PathBuf::from("/tmp/exports"));
    }
}
