//! Global constants for the syllabus auto-save core

use std::time::Duration;

/// Quiet period after the last change before an auto-save fires
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(2000);

/// How long the `Saved` status is shown before reverting to `Idle`
pub const SAVED_STATUS_TTL: Duration = Duration::from_millis(3000);

/// Message recorded when a failed save carries no message of its own
pub const GENERIC_SAVE_ERROR: &str = "Failed to save changes";

/// Default file name of the edited syllabus document
pub const DEFAULT_DOCUMENT_FILENAME: &str = "syllabus-settings.json";
