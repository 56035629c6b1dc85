//! Spinner animation frames
//!
//! Frame sets and tick intervals for the status-line spinner.

use std::time::Duration;

/// Built-in spinner kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinnerKind {
    /// Braille dots, the default
    #[default]
    Dots,
    /// Alternate braille pattern
    Dots2,
    /// Classic spinning line
    Line,
    /// Quarter-circle arc
    Arc,
    /// Rotating arrow
    Arrow,
}

impl SpinnerKind {
    /// Animation frames, cycled in order
    pub fn frames(&self) -> &'static [&'static str] {
        match self {
            Self::Dots => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            Self::Dots2 => &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
            Self::Line => &["-", "\\", "|", "/"],
            Self::Arc => &["◜", "◠", "◝", "◞", "◡", "◟"],
            Self::Arrow => &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"],
        }
    }

    /// Time between frames
    pub fn interval(&self) -> Duration {
        match self {
            Self::Dots | Self::Dots2 => Duration::from_millis(80),
            Self::Line => Duration::from_millis(130),
            Self::Arc | Self::Arrow => Duration::from_millis(100),
        }
    }

    /// Get spinner by name, falling back to the default
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dots2" => Self::Dots2,
            "line" => Self::Line,
            "arc" => Self::Arc,
            "arrow" => Self::Arrow,
            _ => Self::Dots,
        }
    }

    /// List available spinner names
    pub fn list() -> Vec<&'static str> {
        vec!["dots", "dots2", "line", "arc", "arrow"]
    }
}

/// Default spinner taken from the loaded configuration
pub fn default_spinner() -> SpinnerKind {
    SpinnerKind::by_name(&crate::config::config().spinner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_nonempty() {
        for name in SpinnerKind::list() {
            let kind = SpinnerKind::by_name(name);
            assert!(!kind.frames().is_empty());
            assert!(kind.interval() > Duration::ZERO);
        }
    }

    #[test]
    fn test_by_name_falls_back_to_default() {
        assert_eq!(SpinnerKind::by_name("no-such-spinner"), SpinnerKind::Dots);
        assert_eq!(SpinnerKind::by_name("LINE"), SpinnerKind::Line);
    }
}
