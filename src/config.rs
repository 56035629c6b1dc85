//! Configuration, theme and style-rule management for themed-print.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.themed-print/config.toml`
//! - The built-in theme (colours for each token class)
//! - The ordered style-rule table matched against rendered tokens
//!
//! # Configuration File
//!
//! The configuration file is located at `~/.themed-print/config.toml`:
//!
//! ```toml
//! # Colour output: auto, always, never
//! color = "auto"
//!
//! # Default indent width for nested structures
//! indent = 4
//!
//! # Draw vertical indentation guidelines by default
//! show_guideline = false
//!
//! # Default spinner: dots, dots2, line, arc, arrow
//! spinner = "dots"
//! ```
//!
//! The configuration and the style-rule table are loaded once, on first use,
//! and are read-only for the rest of the process lifetime.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use bitflags::bitflags;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Colour output mode: "auto", "always" or "never"
    pub color: String,
    /// Default indent width for nested structures
    pub indent: usize,
    /// Whether indentation guidelines are drawn by default
    pub show_guideline: bool,
    /// Default spinner name
    pub spinner: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: "auto".to_string(),
            indent: 4,
            show_guideline: false,
            spinner: "dots".to_string(),
        }
    }
}

/// Colour output mode parsed from [`Config::color`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    match toml::from_str(&content) {
                        Ok(config) => return config,
                        Err(e) => {
                            tracing::debug!("ignoring malformed config {}: {}", path.display(), e);
                        }
                    }
                }
            }
        }
        Self::default()
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".themed-print").join("config.toml"))
    }

    /// Parse the colour output mode
    pub fn color_mode(&self) -> ColorMode {
        match self.color.to_lowercase().as_str() {
            "always" => ColorMode::Always,
            "never" => ColorMode::Never,
            _ => ColorMode::Auto,
        }
    }
}

/// Process-wide configuration, loaded on first access
pub fn config() -> &'static Config {
    static CONFIG: OnceLock<Config> = OnceLock::new();
    CONFIG.get_or_init(Config::load)
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

bitflags! {
    /// Text attribute flags for a style
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 0b0001;
        const ITALIC    = 0b0010;
        const UNDERLINE = 0b0100;
        const DIM       = 0b1000;
    }
}

/// A display style: an optional foreground colour plus attribute flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub color: Option<Color>,
    pub flags: StyleFlags,
}

impl Style {
    pub const fn plain() -> Self {
        Self {
            color: None,
            flags: StyleFlags::empty(),
        }
    }

    pub const fn fg(color: Color) -> Self {
        Self {
            color: Some(color),
            flags: StyleFlags::empty(),
        }
    }

    pub const fn bold(mut self) -> Self {
        self.flags = self.flags.union(StyleFlags::BOLD);
        self
    }

    pub const fn dim(mut self) -> Self {
        self.flags = self.flags.union(StyleFlags::DIM);
        self
    }
}

/// Identifies one token class in the theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleId {
    Key,
    Str,
    Number,
    True,
    False,
    None,
    Constant,
    EnumPath,
    TypeName,
    Punctuation,
    Timestamp,
    Success,
    Spinner,
}

/// Theme: one style per token class
#[derive(Debug, Clone)]
pub struct Theme {
    pub key: Style,
    pub string: Style,
    pub number: Style,
    pub bool_true: Style,
    pub bool_false: Style,
    pub none: Style,
    pub constant: Style,
    pub enum_path: Style,
    pub type_name: Style,
    pub punctuation: Style,
    pub timestamp: Style,
    pub success: Style,
    pub spinner: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    /// Built-in default theme
    pub fn default_theme() -> Self {
        Self {
            key: Style::fg(Color::new(148, 163, 184)).bold(),
            string: Style::fg(Color::new(95, 215, 135)).bold(),
            number: Style::fg(Color::new(135, 215, 255)).bold(),
            bool_true: Style::fg(Color::new(197, 216, 109)).bold(),
            bool_false: Style::fg(Color::new(216, 130, 157)).bold(),
            none: Style::fg(Color::new(255, 189, 0)).bold(),
            constant: Style::fg(Color::new(255, 155, 84)),
            enum_path: Style::fg(Color::new(205, 180, 219)),
            type_name: Style::fg(Color::new(199, 125, 255)),
            punctuation: Style::fg(Color::new(98, 98, 98)),
            timestamp: Style::fg(Color::new(135, 255, 255)).dim(),
            success: Style::fg(Color::new(175, 255, 215)),
            spinner: Style::fg(Color::new(80, 250, 123)),
        }
    }

    /// Resolve the style for a token class
    pub fn style(&self, id: StyleId) -> Style {
        match id {
            StyleId::Key => self.key,
            StyleId::Str => self.string,
            StyleId::Number => self.number,
            StyleId::True => self.bool_true,
            StyleId::False => self.bool_false,
            StyleId::None => self.none,
            StyleId::Constant => self.constant,
            StyleId::EnumPath => self.enum_path,
            StyleId::TypeName => self.type_name,
            StyleId::Punctuation => self.punctuation,
            StyleId::Timestamp => self.timestamp,
            StyleId::Success => self.success,
            StyleId::Spinner => self.spinner,
        }
    }

    /// Look up a style by name (used for exit messages)
    pub fn named(&self, name: &str) -> Option<Style> {
        let style = match name.to_lowercase().as_str() {
            "key" => self.key,
            "string" | "str" => self.string,
            "number" => self.number,
            "true" => self.bool_true,
            "false" => self.bool_false,
            "none" => self.none,
            "constant" => self.constant,
            "enum" | "enum-path" => self.enum_path,
            "type-name" | "type_name" => self.type_name,
            "punctuation" => self.punctuation,
            "timestamp" => self.timestamp,
            "success" => self.success,
            "spinner" => self.spinner,
            _ => return None,
        };
        Some(style)
    }

    /// List available style names
    pub fn list() -> Vec<&'static str> {
        vec![
            "key",
            "string",
            "number",
            "true",
            "false",
            "none",
            "constant",
            "enum",
            "type-name",
            "punctuation",
            "timestamp",
            "success",
            "spinner",
        ]
    }
}

/// Process-wide theme
pub fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(Theme::default_theme)
}

/// One style rule: a token pattern paired with a token class
#[derive(Debug)]
pub struct StyleRule {
    pub pattern: Regex,
    pub style: StyleId,
}

/// Ordered style-rule table, evaluated first-match-wins
#[derive(Debug, Default)]
pub struct StyleTable {
    rules: Vec<StyleRule>,
}

impl StyleTable {
    /// Built-in rule table.
    ///
    /// Order matters: key labels carry a trailing colon so they must be
    /// tested before the string rule, and constants before enum paths.
    pub fn default_rules() -> Self {
        let specs: &[(&str, StyleId)] = &[
            (r"^(?s).+:$", StyleId::Key),
            (r#"^(?s)(".*"|'.*')$"#, StyleId::Str),
            (r"^true$", StyleId::True),
            (r"^false$", StyleId::False),
            (r"^None$", StyleId::None),
            (
                r"^(-?[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?|0x[0-9a-fA-F]+)$",
                StyleId::Number,
            ),
            (
                r"^\[([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]\]$",
                StyleId::Timestamp,
            ),
            (r"^[A-Z][A-Z0-9_]+$", StyleId::Constant),
            (
                r"^[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)+$",
                StyleId::EnumPath,
            ),
        ];

        let rules = specs
            .iter()
            .filter_map(|(pattern, style)| match Regex::new(pattern) {
                Ok(re) => Some(StyleRule {
                    pattern: re,
                    style: *style,
                }),
                Err(e) => {
                    tracing::debug!("skipping unparsable style rule {}: {}", pattern, e);
                    None
                }
            })
            .collect();

        Self { rules }
    }

    /// Find the first rule matching the token, in table order
    pub fn match_token(&self, token: &str) -> Option<StyleId> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(token))
            .map(|rule| rule.style)
    }

    /// Number of rules in the table
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Process-wide style-rule table, built on first access
pub fn style_table() -> &'static StyleTable {
    static TABLE: OnceLock<StyleTable> = OnceLock::new();
    TABLE.get_or_init(StyleTable::default_rules)
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let table = StyleTable::default_rules();

        // A quoted key token ends with ':' and must hit the key rule,
        // not the string rule further down the table.
        assert_eq!(table.match_token("\"name\":"), Some(StyleId::Key));
        assert_eq!(table.match_token("\"name\""), Some(StyleId::Str));
    }

    #[test]
    fn test_scalar_token_classes() {
        let table = StyleTable::default_rules();

        assert_eq!(table.match_token("true"), Some(StyleId::True));
        assert_eq!(table.match_token("false"), Some(StyleId::False));
        assert_eq!(table.match_token("None"), Some(StyleId::None));
        assert_eq!(table.match_token("42"), Some(StyleId::Number));
        assert_eq!(table.match_token("-3.5"), Some(StyleId::Number));
        assert_eq!(table.match_token("1e-9"), Some(StyleId::Number));
        assert_eq!(table.match_token("0xDEAD"), Some(StyleId::Number));
        assert_eq!(table.match_token("MAX_RETRIES"), Some(StyleId::Constant));
        assert_eq!(table.match_token("Level::Debug"), Some(StyleId::EnumPath));
        assert_eq!(table.match_token("[12:34:56]"), Some(StyleId::Timestamp));
    }

    #[test]
    fn test_unmatched_token() {
        let table = StyleTable::default_rules();
        assert_eq!(table.match_token("plain"), None);
    }

    #[test]
    fn test_named_styles() {
        let theme = Theme::default_theme();
        assert!(theme.named("success").is_some());
        assert!(theme.named("SUCCESS").is_some());
        assert!(theme.named("no-such-style").is_none());
        assert_eq!(theme.named("number"), Some(theme.number));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.indent, 4);
        assert!(!config.show_guideline);
        assert_eq!(config.color_mode(), ColorMode::Auto);
    }

    #[test]
    fn test_config_parses_toml() {
        let config: Config = toml::from_str("color = \"never\"\nindent = 2\n").unwrap();
        assert_eq!(config.color_mode(), ColorMode::Never);
        assert_eq!(config.indent, 2);
        // Unspecified keys fall back to defaults
        assert_eq!(config.spinner, "dots");
    }
}
