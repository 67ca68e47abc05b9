//! Syntax Highlighting Module
//!
//! This module integrates syntect for fenced code block highlighting in the
//! rendered preview.
//!
//! # Features
//! - Loads and caches syntect SyntaxSet and ThemeSet
//! - Resolves language identifiers and common aliases to syntaxes
//! - Produces class-based HTML (`hl-` prefixed classes)
//! - Generates the matching stylesheet for any built-in theme
//!
//! # Example
//! ```ignore
//! use markwise::markdown::syntax::get_highlighter;
//!
//! let html = get_highlighter().highlight_html("fn main() {}", "rust")?;
//! let css = get_highlighter().css_for_theme("base16-ocean.dark", true)?;
//! ```

use log::debug;
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default dark theme name from syntect's built-in themes
pub const DEFAULT_DARK_THEME: &str = "base16-ocean.dark";

/// Default light theme name from syntect's built-in themes
pub const DEFAULT_LIGHT_THEME: &str = "InspiredGitHub";

/// Fallback theme if the specified theme is not found
pub const FALLBACK_THEME: &str = "base16-ocean.dark";

/// Class style shared by generated HTML and stylesheets.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Syntax highlighter that caches syntect sets for performance.
///
/// This struct holds the loaded SyntaxSet and ThemeSet, which are expensive
/// to load and should be reused across highlighting operations.
pub struct SyntaxHighlighter {
    /// Loaded syntax definitions
    syntax_set: SyntaxSet,
    /// Loaded color themes
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with default syntax and theme sets.
    ///
    /// This loads the default syntaxes and themes bundled with syntect.
    /// The operation is relatively expensive, so the highlighter should be
    /// cached and reused.
    pub fn new() -> Self {
        debug!("Loading syntect syntax and theme sets");
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        debug!(
            "Loaded {} syntaxes and {} themes",
            syntax_set.syntaxes().len(),
            theme_set.themes.len()
        );
        Self {
            syntax_set,
            theme_set,
        }
    }

    /// Get available theme names, sorted.
    pub fn available_themes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.theme_set.themes.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get a theme by name, falling back to the default if not found.
    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
    }

    /// Get a theme by name from settings, with fallback based on dark mode.
    pub fn get_theme_by_name_or_mode(&self, theme_name: &str, dark_mode: bool) -> Option<&Theme> {
        if self.theme_set.themes.contains_key(theme_name) {
            return self.get_theme(theme_name);
        }
        let default_name = if dark_mode {
            DEFAULT_DARK_THEME
        } else {
            DEFAULT_LIGHT_THEME
        };
        self.get_theme(default_name)
    }

    /// Whether `language` resolves to a known syntax.
    pub fn supports_language(&self, language: &str) -> bool {
        self.find_syntax_for_language(language).is_some()
    }

    /// Highlight `code` as class-annotated HTML.
    ///
    /// Returns `Ok(None)` when the language is not recognised, so callers
    /// can fall back to escaped plain text.
    pub fn highlight_html(&self, code: &str, language: &str) -> Result<Option<String>> {
        let Some(syntax) = self.find_syntax_for_language(language) else {
            debug!("No syntax found for language: {}", language);
            return Ok(None);
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| Error::Highlight {
                    language: language.to_string(),
                    message: err.to_string(),
                })?;
        }
        Ok(Some(generator.finalize()))
    }

    /// Stylesheet for the `hl-` classes produced by [`Self::highlight_html`].
    pub fn css_for_theme(&self, theme_name: &str, dark_mode: bool) -> Result<String> {
        let theme = self
            .get_theme_by_name_or_mode(theme_name, dark_mode)
            .ok_or_else(|| Error::Highlight {
                language: String::from("css"),
                message: format!("theme '{}' is not available", theme_name),
            })?;
        css_for_theme_with_class_style(theme, CLASS_STYLE).map_err(|err| Error::Highlight {
            language: String::from("css"),
            message: err.to_string(),
        })
    }

    /// Find syntax definition for a language identifier.
    ///
    /// Tries multiple strategies:
    /// 1. By extension (e.g., "rs" -> Rust)
    /// 2. By name (e.g., "Rust" -> Rust)
    /// 3. By case-insensitive name
    fn find_syntax_for_language(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }

        // Normalize the language identifier
        let lang_lower = language.to_lowercase();

        // Map common language aliases to extensions
        let extension = match lang_lower.as_str() {
            "rust" | "rs" => "rs",
            "python" | "py" => "py",
            "javascript" | "js" => "js",
            "typescript" | "ts" => "ts",
            "c" => "c",
            "cpp" | "c++" | "cxx" => "cpp",
            "csharp" | "c#" | "cs" => "cs",
            "java" => "java",
            "go" | "golang" => "go",
            "ruby" | "rb" => "rb",
            "php" => "php",
            "scala" => "scala",
            "html" | "htm" => "html",
            "css" => "css",
            "json" => "json",
            "yaml" | "yml" => "yaml",
            "xml" => "xml",
            "markdown" | "md" => "md",
            "sql" => "sql",
            "shell" | "sh" | "bash" | "zsh" => "sh",
            "makefile" | "make" => "Makefile",
            "lua" => "lua",
            "perl" | "pl" => "pl",
            "r" => "r",
            "haskell" | "hs" => "hs",
            "erlang" | "erl" => "erl",
            "clojure" | "clj" => "clj",
            "diff" | "patch" => "diff",
            "latex" | "tex" => "tex",
            other => other,
        };

        // Try by extension first
        if let Some(syntax) = self.syntax_set.find_syntax_by_extension(extension) {
            return Some(syntax);
        }

        // Try by name
        if let Some(syntax) = self.syntax_set.find_syntax_by_name(language) {
            return Some(syntax);
        }

        // Try case-insensitive name search
        self.syntax_set
            .syntaxes()
            .iter()
            .find(|syntax| syntax.name.to_lowercase() == lang_lower)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Highlighter Instance
// ─────────────────────────────────────────────────────────────────────────────

/// Global syntax highlighter instance.
///
/// This is lazily initialized on first access and reused for all highlighting
/// operations. Using a global instance avoids the cost of loading syntax and
/// theme sets multiple times.
static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();

/// Get or create the global syntax highlighter.
pub fn get_highlighter() -> &'static SyntaxHighlighter {
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
