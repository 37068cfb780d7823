use std::path::PathBuf;
use thiserror::Error;

use crate::config::DocumentFormat;

#[derive(Error, Debug)]
pub enum DocAnalyzerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Rejections that happen before any document reaches extraction.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported file type for '{name}': only PDF and DOCX documents are accepted")]
    UnsupportedFileType { name: String },

    #[error("Failed to inspect file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown question: {0}")]
    UnknownQuestion(u32),

    #[error("Question {question_id} already has the maximum of {limit} files")]
    TooManyFiles { question_id: u32, limit: usize },

    #[error("Nothing to analyze: {0}")]
    NothingToAnalyze(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The {format} file appears to be corrupted or invalid: {reason}")]
    Corrupt {
        format: DocumentFormat,
        reason: String,
    },

    #[error("No extractable text found in {format} document")]
    NoText { format: DocumentFormat },

    #[error("{format} extraction is unavailable: {reason}")]
    Unavailable {
        format: DocumentFormat,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Unable to connect to the inference server at {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("Inference server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },
}

impl AnalysisError {
    pub fn is_connection(&self) -> bool {
        matches!(self, AnalysisError::Connection { .. })
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No results to export")]
    NothingToExport,

    #[error("Failed to create export directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write export file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find a free export filename for '{0}'")]
    NameExhausted(String),
}

pub type Result<T> = std::result::Result<T, DocAnalyzerError>;
