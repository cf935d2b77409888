//! Syllabus - settings and branding editor core
//!
//! Debounced auto-save for the syllabus settings document, the status
//! indicator shown next to the editor, and the application configuration.

pub mod config;
pub mod constants;
pub mod indicator;
pub mod model;
pub mod save;

pub use config::AppConfig;
pub use indicator::SaveIndicator;
pub use model::SyllabusSettings;
pub use save::{AutoSaveController, AutoSaveOptions, SaveOutcome, SaveStatus};
