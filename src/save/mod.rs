//! Debounced auto-save of an edited document.
//!
//! The [`AutoSaveController`] watches a value, persists it through a
//! [`Persist`] implementation after a quiet period, and exposes the status of
//! the save cycle for display.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use syllabus::save::{AutoSaveController, AutoSaveOptions, JsonFilePersister};
//!
//! let local = tokio::task::LocalSet::new();
//! local
//!     .run_until(async {
//!         let persister = JsonFilePersister::new("syllabus-settings.json");
//!         let controller = AutoSaveController::start(settings.clone(), persister, AutoSaveOptions::new());
//!
//!         settings.course_title = "Biology 101".to_string();
//!         controller.observe(settings.clone());
//!
//!         // On navigation away
//!         controller.manual_save().await;
//!         controller.dispose();
//!     })
//!     .await;
//! ```

mod auto_save;
mod error;
mod json_file;
mod options;
mod session;
mod traits;

#[cfg(test)]
mod tests;

pub use auto_save::AutoSaveController;
pub use error::PersistError;
pub use json_file::JsonFilePersister;
pub use options::{AutoSaveOptions, ComparatorFn, ShouldSaveFn, serialized_eq};
pub use session::{SaveOutcome, SaveSession, SaveStatus, SkipReason};
pub use traits::{Persist, PersistFuture};
