//! Save session state exposed to consumers.

use chrono::{DateTime, Utc};

/// Current phase of the save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// Nothing happening
    #[default]
    Idle,
    /// A save is in flight
    Saving,
    /// The last save succeeded (reverts to `Idle` after a short while)
    Saved,
    /// The last save failed
    Error,
}

impl SaveStatus {
    /// Get the display name for this status.
    pub fn name(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "Idle",
            SaveStatus::Saving => "Saving",
            SaveStatus::Saved => "Saved",
            SaveStatus::Error => "Error",
        }
    }
}

/// Snapshot of the observable save state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveSession {
    /// Current status
    pub status: SaveStatus,

    /// Time of the last successful save. Kept until the next success.
    pub last_saved_at: Option<DateTime<Utc>>,

    /// Message of the last failure. Cleared when a new attempt begins.
    pub error: Option<String>,
}

impl SaveSession {
    /// Whether a save is currently in flight.
    pub fn is_saving(&self) -> bool {
        self.status == SaveStatus::Saving
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.status = SaveStatus::Saving;
        self.error = None;
    }

    pub(crate) fn mark_saved(&mut self, at: DateTime<Utc>) {
        self.status = SaveStatus::Saved;
        self.last_saved_at = Some(at);
    }

    pub(crate) fn mark_failed(&mut self, message: String) {
        self.status = SaveStatus::Error;
        self.error = Some(message);
    }

    pub(crate) fn reset(&mut self) {
        self.status = SaveStatus::Idle;
        self.error = None;
    }
}

/// Why a save request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The controller is disabled
    Disabled,
    /// Another save is still in flight
    InFlight,
    /// The `should_save` predicate declined the data
    Declined,
    /// The controller has been disposed
    Disposed,
}

/// Result of a single save request, returned to direct callers only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The data was persisted
    Saved,
    /// The persistence function failed with this message
    Failed(String),
    /// A gate rejected the request before persistence started
    Skipped(SkipReason),
    /// Persistence finished after the controller was disposed
    Discarded,
}

impl SaveOutcome {
    /// Whether the persistence function was invoked.
    pub fn attempted(&self) -> bool {
        !matches!(self, SaveOutcome::Skipped(_))
    }
}
