//! Item progress broadcaster for real-time analysis status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Phase of a unit of work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemPhase {
    Queued,
    Extracting,
    Analyzing,
    Warning,
    Completed,
    Failed,
}

impl std::fmt::Display for ItemPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemPhase::Queued => write!(f, "Queued"),
            ItemPhase::Extracting => write!(f, "Extracting text"),
            ItemPhase::Analyzing => write!(f, "Analyzing"),
            ItemPhase::Warning => write!(f, "Warning"),
            ItemPhase::Completed => write!(f, "Completed"),
            ItemPhase::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Processing,
    Completed,
    Failed,
}

/// Progress event for one unit (a document, or a checklist question).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProgressEvent {
    pub unit_id: String,
    /// File name or question label.
    pub name: String,
    pub phase: ItemPhase,
    pub status: ProgressStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Overall run progress in percent, set on terminal events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemProgressEvent {
    pub fn new(unit_id: &str, name: &str, phase: ItemPhase, message: &str) -> Self {
        let status = match phase {
            ItemPhase::Completed => ProgressStatus::Completed,
            ItemPhase::Failed => ProgressStatus::Failed,
            _ => ProgressStatus::Processing,
        };

        Self {
            unit_id: unit_id.to_string(),
            name: name.to_string(),
            phase,
            status,
            message: message.to_string(),
            timestamp: Utc::now(),
            progress: None,
            confirmed: None,
            error: None,
        }
    }

    pub fn completed(unit_id: &str, name: &str, confirmed: Option<bool>, progress: f64) -> Self {
        Self {
            progress: Some(progress),
            confirmed,
            ..Self::new(
                unit_id,
                name,
                ItemPhase::Completed,
                "Analysis completed successfully",
            )
        }
    }

    pub fn failed(unit_id: &str, name: &str, error: &str, progress: f64) -> Self {
        Self {
            progress: Some(progress),
            error: Some(error.to_string()),
            ..Self::new(unit_id, name, ItemPhase::Failed, "Analysis failed")
        }
    }
}

/// Broadcasts item progress events to any number of subscribers.
#[derive(Clone)]
pub struct ItemProgressBroadcaster {
    sender: Arc<broadcast::Sender<ItemProgressEvent>>,
}

impl ItemProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: ItemProgressEvent) {
        // No active receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ItemProgressEvent> {
        self.sender.subscribe()
    }

    pub fn sender(&self) -> Arc<broadcast::Sender<ItemProgressEvent>> {
        Arc::clone(&self.sender)
    }
}

impl Default for ItemProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Sends events on behalf of a single unit.
pub struct ItemProgressTracker {
    unit_id: String,
    name: String,
    sender: Arc<broadcast::Sender<ItemProgressEvent>>,
}

impl ItemProgressTracker {
    pub fn new(
        unit_id: &str,
        name: &str,
        sender: Arc<broadcast::Sender<ItemProgressEvent>>,
    ) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            name: name.to_string(),
            sender,
        }
    }

    pub fn update_phase(&self, phase: ItemPhase, message: &str) {
        let _ = self.sender.send(ItemProgressEvent::new(
            &self.unit_id,
            &self.name,
            phase,
            message,
        ));
    }

    pub fn warning(&self, message: &str) {
        self.update_phase(ItemPhase::Warning, message);
    }

    pub fn completed(&self, confirmed: Option<bool>, progress: f64) {
        let _ = self.sender.send(ItemProgressEvent::completed(
            &self.unit_id,
            &self.name,
            confirmed,
            progress,
        ));
    }

    pub fn failed(&self, error: &str, progress: f64) {
        let _ = self.sender.send(ItemProgressEvent::failed(
            &self.unit_id,
            &self.name,
            error,
            progress,
        ));
    }
}
