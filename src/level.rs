use std::fmt;
use std::str::FromStr;

use crate::color::Color;

/// Internal severity level.
///
/// The scale is open-ended: the six named constants are anchors, and any
/// other value is valid and sorts between them. Higher means more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i8);

impl Level {
    pub const TRACE: Level = Level(-8);
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);
    pub const FATAL: Level = Level(12);

    const NAMED: [(Level, &'static str); 6] = [
        (Level::TRACE, "TRACE"),
        (Level::DEBUG, "DEBUG"),
        (Level::INFO, "INFO"),
        (Level::WARN, "WARN"),
        (Level::ERROR, "ERROR"),
        (Level::FATAL, "FATAL"),
    ];

    pub const fn new(value: i8) -> Self {
        Level(value)
    }

    pub const fn value(self) -> i8 {
        self.0
    }

    /// Named level at or below `self`, clamped to `TRACE` for values
    /// below the bottom of the scale.
    fn tier(self) -> (Level, &'static str) {
        Self::NAMED
            .iter()
            .rev()
            .find(|(named, _)| *named <= self)
            .copied()
            .unwrap_or(Self::NAMED[0])
    }

    /// Map onto the external severity numbering.
    ///
    /// Total over the whole `i8` range; values between two named levels
    /// take the lower tier, values outside the scale take the nearest end.
    pub fn severity(self) -> Severity {
        let (tier, text) = self.tier();
        let number = match tier {
            Level::TRACE => 1,
            Level::DEBUG => 5,
            Level::INFO => 9,
            Level::WARN => 13,
            Level::ERROR => 17,
            _ => 21,
        };
        Severity { number, text }
    }

    /// Static display colour for the level's tier.
    pub fn color(self) -> Color {
        match self.tier().0 {
            Level::TRACE | Level::DEBUG => Color::LightGray,
            Level::INFO => Color::Cyan,
            Level::WARN => Color::LightYellow,
            Level::ERROR => Color::Red,
            _ => Color::Magenta,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::TRACE,
            tracing::Level::DEBUG => Level::DEBUG,
            tracing::Level::INFO => Level::INFO,
            tracing::Level::WARN => Level::WARN,
            tracing::Level::ERROR => Level::ERROR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tier, name) = self.tier();
        let offset = i16::from(self.0) - i16::from(tier.0);
        match offset {
            0 => f.write_str(name),
            o if o < 0 => write!(f, "{name}{o}"),
            o => write!(f, "{name}+{o}"),
        }
    }
}

/// External severity: the number and the tier name it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Severity {
    pub number: u8,
    pub text: &'static str,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Accepts the six level names in any case, or a raw integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((level, _)) = Self::NAMED
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(trimmed))
        {
            return Ok(*level);
        }
        if trimmed.eq_ignore_ascii_case("warning") {
            return Ok(Level::WARN);
        }
        trimmed
            .parse::<i8>()
            .map(Level)
            .map_err(|_| ParseLevelError(s.to_string()))
    }
}
