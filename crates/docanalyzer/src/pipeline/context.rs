use crate::session::{InputItem, Question};

use super::error::PipelineWarning;

/// The thing a single pipeline pass works on.
#[derive(Debug, Clone)]
pub enum WorkUnit {
    Document(InputItem),
    Question(Question),
}

impl WorkUnit {
    /// Key on the session's status board.
    pub fn key(&self) -> String {
        match self {
            WorkUnit::Document(item) => item.id.clone(),
            WorkUnit::Question(question) => question.unit_key(),
        }
    }

    /// Human readable label for progress events.
    pub fn label(&self) -> String {
        match self {
            WorkUnit::Document(item) => item.name.clone(),
            WorkUnit::Question(question) => question.label(),
        }
    }
}

pub struct UnitContext {
    // Input
    pub unit: WorkUnit,
    pub key: String,
    pub label: String,

    // Extraction result, the text wrapped into the prompt
    pub text: Option<String>,

    // Analysis result
    pub analysis: Option<String>,
    pub confirmed: Option<bool>,

    // Non-fatal warnings
    pub warnings: Vec<PipelineWarning>,
}

impl UnitContext {
    pub fn new(unit: WorkUnit) -> Self {
        let key = unit.key();
        let label = unit.label();
        Self {
            unit,
            key,
            label,
            text: None,
            analysis: None,
            confirmed: None,
            warnings: Vec::new(),
        }
    }
}
