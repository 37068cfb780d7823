pub mod loader;
pub mod schema;

pub use loader::{apply_env_overrides, load_config, load_config_from_str};
pub use schema::{
    ChecklistConfig, Config, DocumentFormat, ExportConfig, InferenceConfig, LoggingConfig,
    QuestionConfig, ServerConfig, DEFAULT_QUESTIONS, DOCX_MIME_TYPE, PDF_MIME_TYPE,
};
