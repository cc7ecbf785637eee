//! Message levels and text effects

use colored::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal message level.
///
/// A message is emitted when its level is at or below the maximum level of
/// its domain. `User` messages are printed without any prefix decoration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum LogLevel {
    User = 0,
    Error = 1,
    Warning = 2,
    DebugWarning = 3,
    #[default]
    Debug = 4,
    DebugVerbose1 = 5,
    DebugVerbose2 = 6,
    DebugVerbose3 = 7,
}

impl LogLevel {
    pub const ALL: [LogLevel; 8] = [
        LogLevel::User,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::DebugWarning,
        LogLevel::Debug,
        LogLevel::DebugVerbose1,
        LogLevel::DebugVerbose2,
        LogLevel::DebugVerbose3,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::User => "USER",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::DebugWarning => "DEBUG_WARNING",
            LogLevel::Debug => "DEBUG",
            LogLevel::DebugVerbose1 => "DEBUG_VERBOSE_1",
            LogLevel::DebugVerbose2 => "DEBUG_VERBOSE_2",
            LogLevel::DebugVerbose3 => "DEBUG_VERBOSE_3",
        }
    }

    /// Tag printed in the level column, e.g. `[warning]`
    pub fn tag(&self) -> &'static str {
        match self {
            LogLevel::User => "[user]",
            LogLevel::Error => "[error]",
            LogLevel::Warning => "[warning]",
            LogLevel::DebugWarning => "[debug warning]",
            LogLevel::Debug => "[debug]",
            LogLevel::DebugVerbose1 => "[verbose 1]",
            LogLevel::DebugVerbose2 => "[verbose 2]",
            LogLevel::DebugVerbose3 => "[verbose 3]",
        }
    }

    /// Width of the widest level tag
    pub fn max_tag_width() -> usize {
        Self::ALL.iter().map(|l| l.tag().len()).max().unwrap_or(0)
    }

    pub fn color_code(&self) -> Color {
        match self {
            LogLevel::User => Color::White,
            LogLevel::Error => Color::Red,
            LogLevel::Warning => Color::Yellow,
            LogLevel::DebugWarning => Color::Yellow,
            LogLevel::Debug => Color::Green,
            LogLevel::DebugVerbose1 => Color::Cyan,
            LogLevel::DebugVerbose2 => Color::Blue,
            LogLevel::DebugVerbose3 => Color::Magenta,
        }
    }

    pub fn text_effect(&self) -> TextEffect {
        match self {
            LogLevel::Error | LogLevel::Warning => TextEffect::Bold,
            LogLevel::DebugVerbose3 => TextEffect::Dim,
            _ => TextEffect::Normal,
        }
    }

    /// Literal tag placed in front of the payload, if any
    pub fn payload_tag(&self) -> Option<&'static str> {
        match self {
            LogLevel::Warning => Some("WARNING: "),
            LogLevel::Error => Some("ERROR: "),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USER" => Ok(LogLevel::User),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "DEBUG_WARNING" => Ok(LogLevel::DebugWarning),
            "DEBUG" => Ok(LogLevel::Debug),
            "DEBUG_VERBOSE_1" | "VERBOSE_1" => Ok(LogLevel::DebugVerbose1),
            "DEBUG_VERBOSE_2" | "VERBOSE_2" => Ok(LogLevel::DebugVerbose2),
            "DEBUG_VERBOSE_3" | "VERBOSE_3" => Ok(LogLevel::DebugVerbose3),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// ANSI text effect used together with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEffect {
    #[default]
    Normal = 0,
    Bold = 1,
    Dim = 2,
    Underlined = 4,
    Blink = 5,
}

impl TextEffect {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(LogLevel::User < LogLevel::Error);
        assert!(LogLevel::Warning < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::DebugVerbose3);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("Verbose_2".parse::<LogLevel>(), Ok(LogLevel::DebugVerbose2));
        assert_eq!(" debug ".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_payload_tags() {
        assert_eq!(LogLevel::Warning.payload_tag(), Some("WARNING: "));
        assert_eq!(LogLevel::Error.payload_tag(), Some("ERROR: "));
        assert_eq!(LogLevel::Debug.payload_tag(), None);
    }

    #[test]
    fn test_max_tag_width() {
        assert_eq!(LogLevel::max_tag_width(), "[debug warning]".len());
    }
}
