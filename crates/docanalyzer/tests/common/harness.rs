//! Test harness for isolated pipeline runs against a mocked inference
//! endpoint.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docanalyzer::config::Config;
use docanalyzer::pipeline::{Pipeline, PipelineConfig, ProgressEvent, ProgressReporter, UnitRef};

use super::builders::{ConfigBuilder, DocxBuilder, PdfBuilder};

/// One reported event, with the unit it belongs to.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub unit_id: String,
    pub name: String,
    pub event: ProgressEvent,
}

/// Collects every progress event reported during a run.
#[derive(Clone, Default)]
pub struct RecordingProgress {
    pub events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Progress values carried by terminal events, in order.
    pub fn progress_values(&self) -> Vec<f64> {
        self.events()
            .iter()
            .filter_map(|e| match e.event {
                ProgressEvent::Completed { progress, .. } => Some(progress),
                ProgressEvent::Failed { progress, .. } => Some(progress),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e.event {
                ProgressEvent::Warning { message } => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, unit: UnitRef<'_>, event: ProgressEvent) {
        self.events.lock().unwrap().push(RecordedEvent {
            unit_id: unit.id.to_string(),
            name: unit.name.to_string(),
            event,
        });
    }
}

/// Temp directories plus a wiremock server standing in for Ollama.
pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub export_dir: PathBuf,
    pub server: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_dir = temp_dir.path().join("input");
        let export_dir = temp_dir.path().join("exports");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input directory");

        Self {
            temp_dir,
            input_dir,
            export_dir,
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> Config {
        ConfigBuilder::new()
            .base_url(&self.server.uri())
            .export_directory(&self.export_dir.to_string_lossy())
            .build()
    }

    pub fn config_with_questions(&self, questions: &[(u32, &str)]) -> Config {
        ConfigBuilder::new()
            .base_url(&self.server.uri())
            .export_directory(&self.export_dir.to_string_lossy())
            .questions(questions)
            .build()
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::from_config(&PipelineConfig::from_config(&self.config()))
    }

    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.input_dir.join(name);
        std::fs::write(&path, contents).expect("Failed to write input file");
        path
    }

    pub fn write_pdf(&self, name: &str, pages: &[&str]) -> PathBuf {
        let builder = pages
            .iter()
            .fold(PdfBuilder::new(), |builder, text| builder.page(text));
        self.write_file(name, &builder.build())
    }

    pub fn write_docx(&self, name: &str, paragraphs: &[&str]) -> PathBuf {
        let builder = paragraphs
            .iter()
            .fold(DocxBuilder::new(), |builder, text| builder.paragraph(text));
        self.write_file(name, &builder.build())
    }

    /// Every generate request answers with `response`.
    pub async fn mock_generate(&self, response: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": response, "done": true })),
            )
            .mount(&self.server)
            .await;
    }

    /// Generate requests whose body contains `needle` answer with `status`.
    /// Takes precedence over [`mock_generate`](Self::mock_generate).
    pub async fn mock_generate_failure_for(&self, needle: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_string_contains(needle))
            .respond_with(ResponseTemplate::new(status).set_body_string("model exploded"))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    pub async fn received_prompts(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| {
                serde_json::from_slice::<serde_json::Value>(&request.body)
                    .ok()
                    .and_then(|body| body["prompt"].as_str().map(str::to_string))
            })
            .collect()
    }
}
