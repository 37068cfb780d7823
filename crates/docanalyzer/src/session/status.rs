use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Extracting,
    Analyzing,
    Completed,
    Error,
}

impl ItemStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Completed | ItemStatus::Error)
    }

    pub fn is_active(self) -> bool {
        matches!(self, ItemStatus::Extracting | ItemStatus::Analyzing)
    }

    /// Forward-only transitions; `error` is reachable from both active states.
    pub fn can_advance_to(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Pending, ItemStatus::Extracting)
                | (ItemStatus::Extracting, ItemStatus::Analyzing)
                | (ItemStatus::Extracting, ItemStatus::Error)
                | (ItemStatus::Analyzing, ItemStatus::Completed)
                | (ItemStatus::Analyzing, ItemStatus::Error)
        )
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "pending"),
            ItemStatus::Extracting => write!(f, "extracting"),
            ItemStatus::Analyzing => write!(f, "analyzing"),
            ItemStatus::Completed => write!(f, "completed"),
            ItemStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Invalid status transition for {unit}: {from} -> {to}")]
    Invalid {
        unit: String,
        from: ItemStatus,
        to: ItemStatus,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub status: ItemStatus,
    pub error: Option<String>,
}

/// Status of every unit of work, keyed by unit id.
#[derive(Debug, Default)]
pub struct StatusBoard {
    entries: HashMap<String, StatusEntry>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unit as pending. An existing entry is left untouched.
    pub fn insert(&mut self, unit: &str) {
        self.entries
            .entry(unit.to_string())
            .or_insert(StatusEntry {
                status: ItemStatus::Pending,
                error: None,
            });
    }

    pub fn remove(&mut self, unit: &str) -> Option<StatusEntry> {
        self.entries.remove(unit)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, unit: &str) -> Option<&StatusEntry> {
        self.entries.get(unit)
    }

    pub fn status(&self, unit: &str) -> Option<ItemStatus> {
        self.entries.get(unit).map(|e| e.status)
    }

    pub fn error(&self, unit: &str) -> Option<&str> {
        self.entries.get(unit).and_then(|e| e.error.as_deref())
    }

    pub fn advance(&mut self, unit: &str, next: ItemStatus) -> Result<(), TransitionError> {
        let entry = self
            .entries
            .get_mut(unit)
            .ok_or_else(|| TransitionError::UnknownUnit(unit.to_string()))?;

        if !entry.status.can_advance_to(next) {
            return Err(TransitionError::Invalid {
                unit: unit.to_string(),
                from: entry.status,
                to: next,
            });
        }

        entry.status = next;
        Ok(())
    }

    /// Moves a unit to `error`, recording `message`.
    pub fn fail(&mut self, unit: &str, message: &str) -> Result<(), TransitionError> {
        self.advance(unit, ItemStatus::Error)?;
        if let Some(entry) = self.entries.get_mut(unit) {
            entry.error = Some(message.to_string());
        }
        Ok(())
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        self.entries.values().filter(|e| e.status == status).count()
    }

    pub fn active_count(&self) -> usize {
        self.entries.values().filter(|e| e.status.is_active()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
