//! Broadcasting of per-unit progress for real-time status streaming.
//!
//! The CLI and any other front end subscribe here instead of polling the
//! session.

pub mod item_progress;

pub use item_progress::{
    ItemPhase, ItemProgressBroadcaster, ItemProgressEvent, ItemProgressTracker, ProgressStatus,
};
