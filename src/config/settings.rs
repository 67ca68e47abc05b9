//! User settings for markwise
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};

use crate::markdown::RenderOptions;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Color theme for the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Color theme (light or dark)
    pub theme: Theme,

    /// syntect theme for code blocks; `None` picks one matching `theme`
    pub code_theme: Option<String>,

    /// Prefix headings with hierarchical numbers like `1.2`
    pub auto_number_headings: bool,

    /// Syntax highlight fenced code blocks
    pub highlight_code: bool,

    /// Spaces inserted by the Tab key
    pub tab_size: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            code_theme: None,
            auto_number_headings: true,
            highlight_code: true,
            tab_size: 2,
        }
    }
}

impl Settings {
    /// Minimum allowed tab size
    pub const MIN_TAB_SIZE: u8 = 1;
    /// Maximum allowed tab size
    pub const MAX_TAB_SIZE: u8 = 8;

    /// Clamp or reset values a hand-edited file could get wrong.
    pub fn sanitize(&mut self) {
        self.tab_size = self.tab_size.clamp(Self::MIN_TAB_SIZE, Self::MAX_TAB_SIZE);

        if self
            .code_theme
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            self.code_theme = None;
        }
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Renderer options derived from these settings.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            auto_number_headings: self.auto_number_headings,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
