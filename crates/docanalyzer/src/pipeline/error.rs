use thiserror::Error;

use crate::error::ValidationError;
use crate::session::TransitionError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("An analysis run is already in progress")]
    AlreadyRunning,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Status board rejected a transition: {0}")]
    Transition(#[from] TransitionError),
}

/// Non-fatal problems met while processing a unit.
#[derive(Debug, Clone)]
pub enum PipelineWarning {
    /// One document of a checklist question could not be read; the question
    /// was analyzed without it.
    DocumentSkipped { name: String, error: String },
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::DocumentSkipped { name, error } => {
                write!(f, "Could not extract text from {}: {}", name, error)
            }
        }
    }
}
