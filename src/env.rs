//! Environment variable names used by this crate for convenient
//! configuration of handlers from command-line tools.
//!
//! These are purely helpers; the handlers themselves never read the
//! environment.

use crate::options::{Options, OptionsError};

/// Minimum level, e.g. `debug`, `warn` or `info+2`.
pub const PRETTY_LOG_LEVEL_ENV: &str = "PRETTY_LOG_LEVEL";

/// `strftime`-style timestamp format for the timestamped style.
pub const PRETTY_LOG_TIME_FORMAT_ENV: &str = "PRETTY_LOG_TIME_FORMAT";

/// Whether to append the caller location (`1`/`true`/`yes`/`on`).
pub const PRETTY_LOG_SHOW_CALLER_ENV: &str = "PRETTY_LOG_SHOW_CALLER";

/// Whether to force colors even when not writing to a terminal.
pub const PRETTY_LOG_FORCE_COLORS_ENV: &str = "PRETTY_LOG_FORCE_COLORS";

impl Options {
    /// Build options from the `PRETTY_LOG_*` variables. Unset variables
    /// keep their defaults.
    pub fn from_env() -> Result<Options, OptionsError> {
        Options::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Options::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Options, OptionsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Options::default();
        if let Some(level) = lookup(PRETTY_LOG_LEVEL_ENV) {
            opts.level = level.parse()?;
        }
        if let Some(format) = lookup(PRETTY_LOG_TIME_FORMAT_ENV) {
            opts.time_format = Some(format);
        }
        if let Some(flag) = lookup(PRETTY_LOG_SHOW_CALLER_ENV) {
            opts.show_caller = parse_flag(PRETTY_LOG_SHOW_CALLER_ENV, &flag)?;
        }
        if let Some(flag) = lookup(PRETTY_LOG_FORCE_COLORS_ENV) {
            opts.force_colors = parse_flag(PRETTY_LOG_FORCE_COLORS_ENV, &flag)?;
        }
        Ok(opts)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, OptionsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OptionsError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}
