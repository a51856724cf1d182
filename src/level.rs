use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::options::OptionsError;

/// Severity of a [`Record`](crate::record::Record).
///
/// Levels are plain integers so that hosts can define custom levels in
/// between the four well-known ones. Higher means more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(pub i32);

impl Level {
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);

    /// Offset this level by `delta`, e.g. `Level::INFO.offset(2)`.
    /// Saturates at the ends of the `i32` range.
    pub const fn offset(self, delta: i32) -> Level {
        Level(self.0.saturating_add(delta))
    }

    fn base(self) -> (&'static str, Level) {
        if self < Level::INFO {
            ("DEBUG", Level::DEBUG)
        } else if self < Level::WARN {
            ("INFO", Level::INFO)
        } else if self < Level::ERROR {
            ("WARN", Level::WARN)
        } else {
            ("ERROR", Level::ERROR)
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, base) = self.base();
        let delta = i64::from(self.0) - i64::from(base.0);
        if delta == 0 {
            f.write_str(name)
        } else {
            write!(f, "{name}{delta:+}")
        }
    }
}

impl FromStr for Level {
    type Err = OptionsError;

    /// Parses `debug`, `info`, `warn` or `error` (any case), optionally
    /// followed by a signed offset such as `info+2` or `ERROR-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OptionsError::InvalidLevel(s.to_string());
        let trimmed = s.trim();
        let split = trimmed.find(['+', '-']).unwrap_or(trimmed.len());
        let (name, delta) = trimmed.split_at(split);

        let base = match name.to_ascii_lowercase().as_str() {
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => return Err(invalid()),
        };

        if delta.is_empty() {
            return Ok(base);
        }
        let delta: i32 = delta.parse().map_err(|_| invalid())?;
        base.0.checked_add(delta).map(Level).ok_or_else(invalid)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::DEBUG.offset(-4),
            tracing::Level::DEBUG => Level::DEBUG,
            tracing::Level::INFO => Level::INFO,
            tracing::Level::WARN => Level::WARN,
            tracing::Level::ERROR => Level::ERROR,
        }
    }
}
