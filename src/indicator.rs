//! Save status indicator shown next to the editor.
//!
//! Maps a [`SaveSession`] to the text the UI displays. Rendering itself is
//! left to the caller.

use chrono::{DateTime, Local, Utc};

use crate::constants::GENERIC_SAVE_ERROR;
use crate::save::{SaveSession, SaveStatus};

/// What the status area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveIndicator {
    /// Nothing saved yet and nothing happening
    Hidden,
    /// A save is in flight
    Saving,
    /// Just saved
    Saved {
        /// Relative time since the save
        since: String,
    },
    /// Idle after an earlier save
    LastSaved {
        /// Relative time since the save
        since: String,
    },
    /// The last save failed
    Error {
        /// Failure message
        message: String,
    },
}

impl SaveIndicator {
    /// Build the indicator for `session` as of `now`.
    pub fn from_session(session: &SaveSession, now: DateTime<Utc>) -> Self {
        match session.status {
            SaveStatus::Saving => SaveIndicator::Saving,
            SaveStatus::Error => SaveIndicator::Error {
                message: session
                    .error
                    .clone()
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_SAVE_ERROR.to_string()),
            },
            SaveStatus::Saved => SaveIndicator::Saved {
                since: session
                    .last_saved_at
                    .map(|at| time_since(at, now))
                    .unwrap_or_else(|| "just now".to_string()),
            },
            SaveStatus::Idle => match session.last_saved_at {
                Some(at) => SaveIndicator::LastSaved {
                    since: time_since(at, now),
                },
                None => SaveIndicator::Hidden,
            },
        }
    }

    /// Text to display, or `None` when nothing should be rendered.
    pub fn label(&self) -> Option<String> {
        match self {
            SaveIndicator::Hidden => None,
            SaveIndicator::Saving => Some("Saving...".to_string()),
            SaveIndicator::Saved { since } => Some(format!("Saved {}", since)),
            SaveIndicator::LastSaved { since } => Some(format!("Last saved {}", since)),
            SaveIndicator::Error { message } => Some(format!("Save failed: {}", message)),
        }
    }
}

/// Human-readable time elapsed between `then` and `now`.
///
/// Under ten seconds reads "just now", then seconds, minutes and hours, and
/// after a day the calendar date of `then` in local time. Timestamps in the
/// future read "just now".
pub fn time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);

    if seconds < 10 {
        "just now".to_string()
    } else if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 60 * 60 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 24 * 60 * 60 {
        format!("{}h ago", seconds / (60 * 60))
    } else {
        then.with_timezone(&Local).format("%b %-d, %Y").to_string()
    }
}
