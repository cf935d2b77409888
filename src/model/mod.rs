//! Data models for the syllabus editor.

mod syllabus;

pub use syllabus::{Branding, FieldError, SyllabusSettings};
