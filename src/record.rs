use chrono::{DateTime, FixedOffset, Local};
use std::borrow::Cow;
use std::panic::Location;
use std::path::Path;

use crate::level::Level;
use crate::value::Attr;

/// Source location a record was emitted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: Cow<'static, str>,
    pub line: u32,
}

impl Caller {
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Caller {
            file: file.into(),
            line,
        }
    }

    /// Location of the code calling this function.
    #[track_caller]
    pub fn here() -> Self {
        let location = Location::caller();
        Caller::new(location.file(), location.line())
    }

    /// File name without its directories.
    pub fn file_name(&self) -> &str {
        let file: &str = &self.file;
        Path::new(file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file)
    }
}

/// One structured log event, built right before it is handed to a
/// [`Handler`](crate::handler::Handler) and not retained afterwards.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<FixedOffset>,
    pub level: Level,
    pub message: String,
    pub caller: Option<Caller>,
    attrs: Vec<Attr>,
}

impl Record {
    pub fn new(
        time: DateTime<FixedOffset>,
        level: Level,
        message: impl Into<String>,
        caller: Option<Caller>,
    ) -> Self {
        Record {
            time,
            level,
            message: message.into(),
            caller,
            attrs: Vec::new(),
        }
    }

    /// Record stamped with the local wall clock and no caller.
    pub fn now(level: Level, message: impl Into<String>) -> Self {
        Record::new(Local::now().fixed_offset(), level, message, None)
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }

    /// The record's own attributes, in the order they were added.
    pub fn attrs(&self) -> std::slice::Iter<'_, Attr> {
        self.attrs.iter()
    }
}
