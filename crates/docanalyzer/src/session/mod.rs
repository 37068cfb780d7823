//! Session state: admitted documents, checklist questions, per-unit status,
//! accumulated results and overall progress.
//!
//! The pipeline is the only writer during a run; observers read
//! [`SessionSnapshot`]s or subscribe to progress broadcasts.

pub mod item;
pub mod status;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ChecklistConfig, DocumentFormat};
use crate::error::ValidationError;
use crate::sanitize;

pub use item::{question_key, AnalysisResult, InputItem, Question, ResultSource};
pub use status::{ItemStatus, StatusBoard, StatusEntry, TransitionError};

/// Which kind of unit a session analyzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Every admitted document is summarized on its own.
    Documents,
    /// Each checklist question is answered from the documents attached to it.
    Checklist,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub name: String,
    pub reason: String,
}

/// Outcome of admitting a batch of files.
#[derive(Debug, Default, Serialize)]
pub struct AdmissionReport {
    pub admitted: Vec<InputItem>,
    pub rejected: Vec<Rejection>,
}

impl AdmissionReport {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

pub struct Session {
    mode: AnalysisMode,
    items: Vec<InputItem>,
    questions: Vec<Question>,
    board: StatusBoard,
    results: Vec<AnalysisResult>,
    progress: f64,
    analyzing: bool,
    max_files_per_question: usize,
}

impl Session {
    /// A session in document mode.
    pub fn documents() -> Self {
        Self {
            mode: AnalysisMode::Documents,
            items: Vec::new(),
            questions: Vec::new(),
            board: StatusBoard::new(),
            results: Vec::new(),
            progress: 0.0,
            analyzing: false,
            max_files_per_question: 0,
        }
    }

    /// A session in checklist mode over the configured questions.
    pub fn checklist(config: &ChecklistConfig) -> Self {
        Self {
            mode: AnalysisMode::Checklist,
            questions: config
                .questions
                .iter()
                .map(|q| Question::new(q.id, &q.text))
                .collect(),
            max_files_per_question: config.max_files_per_question,
            ..Self::documents()
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Admits one document in document mode.
    pub fn admit_file(
        &mut self,
        path: &Path,
        declared_mime: Option<&str>,
    ) -> Result<&InputItem, ValidationError> {
        if self.mode != AnalysisMode::Documents {
            return Err(ValidationError::MissingField("question id".to_string()));
        }

        let item = InputItem::from_path(path, declared_mime)?;
        info!(
            item_id = %item.id,
            filename = %sanitize::redact_path(&item.path),
            format = %item.format,
            size = item.size,
            "Admitted document"
        );

        self.board.insert(&item.id);
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Admits a batch of documents, collecting rejections instead of failing.
    pub fn admit_files<I, P>(&mut self, paths: I) -> AdmissionReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = AdmissionReport::default();

        for path in paths {
            let path = path.as_ref();
            match self.admit_file(path, None) {
                Ok(item) => report.admitted.push(item.clone()),
                Err(e) => {
                    let name = sanitize::redact_path(path);
                    warn!(filename = %name, error = %e, "Rejected document");
                    report.rejected.push(Rejection {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Attaches a document to a checklist question.
    pub fn admit_for_question(
        &mut self,
        question_id: u32,
        path: &Path,
        declared_mime: Option<&str>,
    ) -> Result<&InputItem, ValidationError> {
        let limit = self.max_files_per_question;
        let index = self
            .questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or(ValidationError::UnknownQuestion(question_id))?;

        if self.questions[index].files.len() >= limit {
            warn!(
                question_id,
                limit, "Question already has the maximum number of files"
            );
            return Err(ValidationError::TooManyFiles { question_id, limit });
        }

        let item = InputItem::from_path(path, declared_mime).inspect_err(|e| {
            warn!(
                question_id,
                filename = %sanitize::redact_path(path),
                error = %e,
                "Rejected document"
            );
        })?;

        info!(
            question_id,
            item_id = %item.id,
            filename = %sanitize::redact_path(&item.path),
            "Attached document to question"
        );

        self.reopen_if_finished(index);
        let question = &mut self.questions[index];
        self.board.insert(&question.unit_key());
        question.files.push(item);
        Ok(&question.files[question.files.len() - 1])
    }

    /// Removes a document by id, from document mode items or from whichever
    /// question holds it, together with any result produced from it.
    /// Returns the removed item.
    pub fn remove_file(&mut self, item_id: &str) -> Option<InputItem> {
        if let Some(pos) = self.items.iter().position(|i| i.id == item_id) {
            self.board.remove(item_id);
            self.results.retain(
                |r| !matches!(&r.source, ResultSource::Document { item_id: id, .. } if id == item_id),
            );
            return Some(self.items.remove(pos));
        }

        let (index, pos) = self.questions.iter().enumerate().find_map(|(index, q)| {
            q.files
                .iter()
                .position(|i| i.id == item_id)
                .map(|pos| (index, pos))
        })?;

        let removed = self.questions[index].files.remove(pos);
        if self.questions[index].files.is_empty() {
            self.forget_question(index);
        } else if self.reopen_if_finished(index) {
            self.board.insert(&self.questions[index].unit_key());
        }
        Some(removed)
    }

    /// Puts a finished question back in line after its evidence changed.
    /// Returns whether the question had finished.
    fn reopen_if_finished(&mut self, index: usize) -> bool {
        let finished = self
            .board
            .status(&self.questions[index].unit_key())
            .is_some_and(ItemStatus::is_terminal);
        if finished {
            info!(
                question_id = self.questions[index].id,
                "Reopening answered question"
            );
            self.forget_question(index);
        }
        finished
    }

    /// Drops a question's status, confirmation and results.
    fn forget_question(&mut self, index: usize) {
        let question = &mut self.questions[index];
        let question_id = question.id;
        question.confirmed = None;
        self.board.remove(&question.unit_key());
        self.results.retain(
            |r| !matches!(&r.source, ResultSource::Question { id, .. } if *id == question_id),
        );
    }

    pub fn set_context(&mut self, question_id: u32, context: &str) -> Result<(), ValidationError> {
        let question = self
            .questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or(ValidationError::UnknownQuestion(question_id))?;

        let context = context.trim();
        question.context = if context.is_empty() {
            None
        } else {
            Some(context.to_string())
        };
        Ok(())
    }

    /// Drops all documents, statuses and results. Questions stay, without
    /// their files, context or confirmation.
    pub fn clear(&mut self) {
        self.items.clear();
        for question in &mut self.questions {
            question.files.clear();
            question.context = None;
            question.confirmed = None;
        }
        self.board.clear();
        self.results.clear();
        self.progress = 0.0;
    }

    pub fn items(&self) -> &[InputItem] {
        &self.items
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn status(&self, unit: &str) -> Option<ItemStatus> {
        self.board.status(unit)
    }

    pub fn board(&self) -> &StatusBoard {
        &self.board
    }

    /// Document mode items still waiting to be analyzed, in admission order.
    pub fn pending_items(&self) -> Vec<InputItem> {
        self.items
            .iter()
            .filter(|i| self.board.status(&i.id) == Some(ItemStatus::Pending))
            .cloned()
            .collect()
    }

    /// Checklist questions with at least one file still waiting to be
    /// analyzed, in checklist order.
    pub fn pending_questions(&self) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| {
                !q.files.is_empty() && self.board.status(&q.unit_key()) == Some(ItemStatus::Pending)
            })
            .cloned()
            .collect()
    }

    pub(crate) fn begin_run(&mut self) {
        self.analyzing = true;
        self.progress = 0.0;
    }

    pub(crate) fn finish_run(&mut self) {
        self.analyzing = false;
        self.progress = 100.0;
    }

    /// Clears the analyzing flag without marking the run complete.
    pub(crate) fn abort_run(&mut self) {
        self.analyzing = false;
    }

    pub(crate) fn board_mut(&mut self) -> &mut StatusBoard {
        &mut self.board
    }

    pub(crate) fn set_progress(&mut self, progress: f64) {
        if progress > self.progress {
            self.progress = progress.min(100.0);
        }
    }

    pub(crate) fn record_result(&mut self, result: AnalysisResult) {
        self.results.push(result);
    }

    pub(crate) fn set_confirmed(&mut self, question_id: u32, confirmed: bool) {
        if let Some(question) = self.questions.iter_mut().find(|q| q.id == question_id) {
            question.confirmed = Some(confirmed);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let items = self
            .items
            .iter()
            .map(|item| ItemSnapshot::new(item, self.board.get(&item.id)))
            .collect();

        let questions = self
            .questions
            .iter()
            .map(|q| {
                let entry = self.board.get(&q.unit_key());
                QuestionSnapshot {
                    id: q.id,
                    text: q.text.clone(),
                    context: q.context.clone(),
                    files: q.files.iter().map(|f| ItemSnapshot::new(f, None)).collect(),
                    status: entry.map(|e| e.status),
                    error: entry.and_then(|e| e.error.clone()),
                    confirmed: q.confirmed,
                }
            })
            .collect();

        SessionSnapshot {
            mode: self.mode,
            progress: self.progress,
            analyzing: self.analyzing,
            items,
            questions,
            results: self.results.clone(),
        }
    }
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: AnalysisMode,
    pub progress: f64,
    pub analyzing: bool,
    pub items: Vec<ItemSnapshot>,
    pub questions: Vec<QuestionSnapshot>,
    pub results: Vec<AnalysisResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub format: DocumentFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemSnapshot {
    fn new(item: &InputItem, entry: Option<&StatusEntry>) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            size: item.size,
            format: item.format,
            status: entry.map(|e| e.status),
            error: entry.and_then(|e| e.error.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSnapshot {
    pub id: u32,
    pub text: String,
    pub context: Option<String>,
    pub files: Vec<ItemSnapshot>,
    pub status: Option<ItemStatus>,
    pub error: Option<String>,
    pub confirmed: Option<bool>,
}
