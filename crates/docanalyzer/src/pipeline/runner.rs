use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::analysis::prompt::{append_document, append_failed_document};
use crate::analysis::{document_prompt, is_confirmed, question_prompt, AnalysisClient, OllamaClient};
use crate::broadcast::item_progress::ItemPhase;
use crate::error::{AnalysisError, ValidationError};
use crate::extractor::ExtractorRegistry;
use crate::sanitize;
use crate::session::{AnalysisMode, AnalysisResult, ItemStatus, ResultSource, Session};

use super::config::PipelineConfig;
use super::context::{UnitContext, WorkUnit};
use super::error::{PipelineError, PipelineWarning};
use super::progress::{ProgressEvent, ProgressReporter, UnitRef};

/// Counts for one finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

enum UnitOutcome {
    Completed,
    Failed(String),
}

pub struct Pipeline {
    extractors: Arc<ExtractorRegistry>,
    client: Arc<dyn AnalysisClient>,
}

impl Pipeline {
    /// Production constructor, talking to the configured Ollama endpoint.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            extractors: Arc::new(ExtractorRegistry::new()),
            client: Arc::new(OllamaClient::new(&config.inference)),
        }
    }

    pub fn new(extractors: Arc<ExtractorRegistry>, client: Arc<dyn AnalysisClient>) -> Self {
        Self { extractors, client }
    }

    /// Processes every pending unit of `session` one at a time.
    ///
    /// Unit failures are recorded on the session and do not stop the run.
    /// Progress is exactly 100 when this returns `Ok`.
    pub async fn run(
        &self,
        session: &mut Session,
        progress: &dyn ProgressReporter,
    ) -> Result<RunSummary, PipelineError> {
        if session.is_analyzing() {
            return Err(PipelineError::AlreadyRunning);
        }

        let mode = session.mode();
        let units: Vec<WorkUnit> = match mode {
            AnalysisMode::Documents => session
                .pending_items()
                .into_iter()
                .map(WorkUnit::Document)
                .collect(),
            AnalysisMode::Checklist => session
                .pending_questions()
                .into_iter()
                .map(WorkUnit::Question)
                .collect(),
        };

        if units.is_empty() {
            let reason = match mode {
                AnalysisMode::Documents => "no pending documents",
                AnalysisMode::Checklist => "no questions with pending documents",
            };
            return Err(ValidationError::NothingToAnalyze(reason.to_string()).into());
        }

        let pipeline_span = info_span!("pipeline", mode = ?mode, units = units.len());

        session.begin_run();
        let outcome = self
            .run_units(session, units, progress)
            .instrument(pipeline_span)
            .await;

        match outcome {
            Ok(summary) => {
                session.finish_run();
                info!(
                    total = summary.total,
                    completed = summary.completed,
                    failed = summary.failed,
                    "Analysis run finished"
                );
                Ok(summary)
            }
            Err(e) => {
                session.abort_run();
                Err(e)
            }
        }
    }

    async fn run_units(
        &self,
        session: &mut Session,
        units: Vec<WorkUnit>,
        progress: &dyn ProgressReporter,
    ) -> Result<RunSummary, PipelineError> {
        let total = units.len();
        let mut summary = RunSummary {
            total,
            completed: 0,
            failed: 0,
        };

        for unit in &units {
            let (key, label) = (unit.key(), unit.label());
            progress.report(
                UnitRef {
                    id: &key,
                    name: &label,
                },
                ProgressEvent::Phase {
                    phase: ItemPhase::Queued,
                    message: "Queued for analysis".to_string(),
                },
            );
        }

        for (index, unit) in units.into_iter().enumerate() {
            let mut ctx = UnitContext::new(unit);
            let unit_span = info_span!("unit", unit = %ctx.key, name = %ctx.label);

            let outcome = self
                .run_unit(session, &mut ctx, progress)
                .instrument(unit_span)
                .await?;

            let percent = (index + 1) as f64 / total as f64 * 100.0;
            session.set_progress(percent);

            let unit_ref = UnitRef {
                id: &ctx.key,
                name: &ctx.label,
            };
            match outcome {
                UnitOutcome::Completed => {
                    summary.completed += 1;
                    progress.report(
                        unit_ref,
                        ProgressEvent::Completed {
                            confirmed: ctx.confirmed,
                            progress: percent,
                        },
                    );
                }
                UnitOutcome::Failed(error) => {
                    summary.failed += 1;
                    progress.report(
                        unit_ref,
                        ProgressEvent::Failed {
                            error,
                            progress: percent,
                        },
                    );
                }
            }
        }

        Ok(summary)
    }

    async fn run_unit(
        &self,
        session: &mut Session,
        ctx: &mut UnitContext,
        progress: &dyn ProgressReporter,
    ) -> Result<UnitOutcome, PipelineError> {
        // Step 1: Extract text
        session
            .board_mut()
            .advance(&ctx.key, ItemStatus::Extracting)?;
        progress.report(
            unit_ref(ctx),
            ProgressEvent::Phase {
                phase: ItemPhase::Extracting,
                message: "Extracting text...".to_string(),
            },
        );

        if let Err(message) = self
            .step_extract(ctx, progress)
            .instrument(info_span!("extract"))
            .await
        {
            warn!(error = %message, "Text extraction failed");
            session.board_mut().fail(&ctx.key, &message)?;
            return Ok(UnitOutcome::Failed(message));
        }

        // Step 2: Analyze
        session
            .board_mut()
            .advance(&ctx.key, ItemStatus::Analyzing)?;
        progress.report(
            unit_ref(ctx),
            ProgressEvent::Phase {
                phase: ItemPhase::Analyzing,
                message: "Analyzing with the language model...".to_string(),
            },
        );

        if let Err(e) = self
            .step_analyze(ctx)
            .instrument(info_span!("analyze"))
            .await
        {
            let message = e.to_string();
            warn!(error = %message, connection = e.is_connection(), "Analysis failed");
            session.board_mut().fail(&ctx.key, &message)?;
            return Ok(UnitOutcome::Failed(message));
        }

        // Step 3: Record the result
        let source = match &ctx.unit {
            WorkUnit::Document(item) => ResultSource::Document {
                item_id: item.id.clone(),
                name: item.name.clone(),
            },
            WorkUnit::Question(question) => {
                if let Some(confirmed) = ctx.confirmed {
                    session.set_confirmed(question.id, confirmed);
                }
                ResultSource::Question {
                    id: question.id,
                    text: question.text.clone(),
                }
            }
        };
        let analysis = ctx.analysis.take().unwrap_or_default();
        session.record_result(AnalysisResult::new(source, analysis, ctx.confirmed));
        session
            .board_mut()
            .advance(&ctx.key, ItemStatus::Completed)?;

        info!(
            confirmed = ?ctx.confirmed,
            warnings = ctx.warnings.len(),
            "Unit analyzed"
        );
        Ok(UnitOutcome::Completed)
    }

    /// Fills `ctx.text`. Checklist questions tolerate unreadable documents
    /// as long as at least one yields text.
    async fn step_extract(
        &self,
        ctx: &mut UnitContext,
        progress: &dyn ProgressReporter,
    ) -> Result<(), String> {
        match &ctx.unit {
            WorkUnit::Document(item) => {
                debug!(filename = %sanitize::redact_path(&item.path), format = %item.format, "Extracting document");
                let extracted = Arc::clone(&self.extractors)
                    .extract_file_blocking(item.path.clone(), item.format)
                    .await
                    .map_err(|e| e.to_string())?;
                ctx.text = Some(extracted.text);
            }
            WorkUnit::Question(question) => {
                let mut combined = String::new();
                let mut extracted_any = false;
                let mut last_error = None;

                for file in &question.files {
                    debug!(filename = %sanitize::redact_path(&file.path), format = %file.format, "Extracting document");
                    match Arc::clone(&self.extractors)
                        .extract_file_blocking(file.path.clone(), file.format)
                        .await
                    {
                        Ok(extracted) => {
                            append_document(&mut combined, &file.name, &extracted.text);
                            extracted_any = true;
                        }
                        Err(e) => {
                            warn!(filename = %file.name, error = %e, "Skipping unreadable document");
                            append_failed_document(&mut combined, &file.name);

                            let warning = PipelineWarning::DocumentSkipped {
                                name: file.name.clone(),
                                error: e.to_string(),
                            };
                            progress.report(
                                UnitRef {
                                    id: &ctx.key,
                                    name: &ctx.label,
                                },
                                ProgressEvent::Warning {
                                    message: warning.to_string(),
                                },
                            );
                            ctx.warnings.push(warning);
                            last_error = Some(e);
                        }
                    }
                }

                if !extracted_any {
                    return Err(last_error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "No documents attached".to_string()));
                }
                ctx.text = Some(combined);
            }
        }

        Ok(())
    }

    async fn step_analyze(&self, ctx: &mut UnitContext) -> Result<(), AnalysisError> {
        let text = ctx.text.as_deref().unwrap_or_default();
        let prompt = match &ctx.unit {
            WorkUnit::Document(_) => document_prompt(text),
            WorkUnit::Question(question) => {
                question_prompt(&question.text, question.context.as_deref(), text)
            }
        };

        let analysis = self.client.generate(&prompt).await?;

        if let WorkUnit::Question(_) = ctx.unit {
            ctx.confirmed = Some(is_confirmed(&analysis));
        }
        ctx.analysis = Some(analysis);
        Ok(())
    }
}

fn unit_ref(ctx: &UnitContext) -> UnitRef<'_> {
    UnitRef {
        id: &ctx.key,
        name: &ctx.label,
    }
}
