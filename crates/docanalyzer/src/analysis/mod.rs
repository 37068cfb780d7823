pub mod client;
pub mod ollama;
pub mod prompt;

pub use client::AnalysisClient;
pub use ollama::OllamaClient;
pub use prompt::{document_prompt, is_confirmed, question_prompt};
