//! Syllabus settings document edited in the settings/branding editor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Course settings and institution branding for one syllabus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyllabusSettings {
    /// Course title shown in the header
    pub course_title: String,
    /// Course code (e.g. "BIO 101")
    pub course_code: String,
    /// Academic term (e.g. "Fall 2026")
    pub term: String,
    /// Instructor name
    pub instructor: String,
    /// Institution branding
    pub branding: Branding,
}

/// Visual identity applied to the syllabus preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    /// Institution name
    pub institution_name: String,
    /// URL of the institution logo
    pub logo_url: String,
    /// Primary color as a CSS color string
    pub primary_color: String,
    /// Accent color as a CSS color string
    pub accent_color: String,
    /// Font family for headings and body text
    pub font_family: String,
    /// Footer text on every page
    pub footer_text: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            institution_name: String::new(),
            logo_url: String::new(),
            primary_color: "#1e3a8a".to_string(),
            accent_color: "#f59e0b".to_string(),
            font_family: "Inter".to_string(),
            footer_text: String::new(),
        }
    }
}

/// Error returned by [`SyllabusSettings::set_field`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// No field with this name
    #[error("Unknown field '{0}'")]
    UnknownField(String),
}

impl SyllabusSettings {
    /// Names accepted by [`set_field`](Self::set_field).
    pub const FIELDS: &'static [&'static str] = &[
        "course_title",
        "course_code",
        "term",
        "instructor",
        "institution_name",
        "logo_url",
        "primary_color",
        "accent_color",
        "font_family",
        "footer_text",
    ];

    /// Set a field by name. Branding fields are addressed without a prefix.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        let slot = match name {
            "course_title" => &mut self.course_title,
            "course_code" => &mut self.course_code,
            "term" => &mut self.term,
            "instructor" => &mut self.instructor,
            "institution_name" => &mut self.branding.institution_name,
            "logo_url" => &mut self.branding.logo_url,
            "primary_color" => &mut self.branding.primary_color,
            "accent_color" => &mut self.branding.accent_color,
            "font_family" => &mut self.branding.font_family,
            "footer_text" => &mut self.branding.footer_text,
            _ => return Err(FieldError::UnknownField(name.to_string())),
        };
        *slot = value.to_string();
        Ok(())
    }
}
