use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use serde::Deserialize;

use crate::level::Level;

/// `3:04PM`, the time format used by [`Timestamped`](crate::handler::Timestamped)
/// when none is configured.
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M%p";

/// Options shared by both handler styles.
///
/// Deserializable from any serde format; missing fields take their
/// defaults:
///
/// ```
/// # use pretty_log_sink::{level::Level, options::Options};
/// let opts: Options = serde_json::from_str(r#"{"level": "warn", "show_caller": true}"#).unwrap();
/// assert_eq!(opts.level, Level::WARN);
/// assert!(opts.show_caller);
/// assert!(!opts.force_colors);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// `strftime`-style format for the timestamp of the timestamped style.
    pub time_format: Option<String>,

    /// Records below this level are not handled.
    pub level: Level,

    /// Append ` [file:line]` of the record's caller.
    pub show_caller: bool,

    /// Always emit colors instead of only when writing to a terminal.
    pub force_colors: bool,
}

impl Options {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = Some(format.into());
        self
    }

    pub fn with_caller(mut self, show_caller: bool) -> Self {
        self.show_caller = show_caller;
        self
    }

    pub fn with_force_colors(mut self, force_colors: bool) -> Self {
        self.force_colors = force_colors;
        self
    }

    /// The configured time format, or [`DEFAULT_TIME_FORMAT`].
    pub fn time_format_or_default(&self) -> &str {
        self.time_format.as_deref().unwrap_or(DEFAULT_TIME_FORMAT)
    }
}

/// Error type returned when options are invalid.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("invalid time format: {0:?}")]
    InvalidTimeFormat(String),

    #[error("unknown log level: {0:?}")]
    InvalidLevel(String),

    #[error("invalid boolean for {key}: {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

/// Reject formats chrono cannot render.
///
/// Some specifiers (such as `%#z`) parse but only work for parsing, so the
/// format is also rendered once against a fixed timestamp.
pub fn validate_time_format(format: &str) -> Result<(), OptionsError> {
    let invalid = || OptionsError::InvalidTimeFormat(format.to_string());
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }

    let sample = DateTime::<Utc>::from_timestamp(0, 0).ok_or_else(invalid)?.fixed_offset();
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format_with_items(items.iter())).map_err(|_| invalid())
}
