pub mod analysis;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod observability;
pub mod pipeline;
pub mod sanitize;
pub mod server;
pub mod session;

pub use analysis::{AnalysisClient, OllamaClient};
pub use broadcast::{ItemProgressBroadcaster, ItemProgressEvent};
pub use config::{apply_env_overrides, load_config, load_config_from_str, Config, DocumentFormat};
pub use error::{
    AnalysisError, ConfigError, DocAnalyzerError, ExportError, ExtractError, Result,
    ValidationError,
};
pub use export::{ExportArtifact, ExportWriter};
pub use extractor::{ExtractedText, ExtractorRegistry, TextExtractor};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, RunSummary};
pub use session::{AnalysisMode, AnalysisResult, InputItem, ItemStatus, Session, SessionSnapshot};
