use crate::broadcast::item_progress::{ItemPhase, ItemProgressBroadcaster, ItemProgressTracker};

/// Identifies the unit an event belongs to.
#[derive(Debug, Clone, Copy)]
pub struct UnitRef<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

/// Events emitted by the pipeline while processing a unit.
/// Extracted text and analyses are omitted (can be large).
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Phase { phase: ItemPhase, message: String },
    Warning { message: String },
    Completed { confirmed: Option<bool>, progress: f64 },
    Failed { error: String, progress: f64 },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, unit: UnitRef<'_>, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _unit: UnitRef<'_>, _event: ProgressEvent) {}
}

/// Bridges pipeline events to the item progress broadcast channel.
pub struct BroadcastProgress {
    broadcaster: ItemProgressBroadcaster,
}

impl BroadcastProgress {
    pub fn new(broadcaster: ItemProgressBroadcaster) -> Self {
        Self { broadcaster }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, unit: UnitRef<'_>, event: ProgressEvent) {
        let tracker = ItemProgressTracker::new(unit.id, unit.name, self.broadcaster.sender());
        match event {
            ProgressEvent::Phase { phase, message } => tracker.update_phase(phase, &message),
            ProgressEvent::Warning { message } => tracker.warning(&message),
            ProgressEvent::Completed {
                confirmed,
                progress,
            } => tracker.completed(confirmed, progress),
            ProgressEvent::Failed { error, progress } => tracker.failed(&error, progress),
        }
    }
}
