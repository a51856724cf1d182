//! The two human-readable handler styles and the contract they implement.

use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::color::{self, Color};
use crate::level::Level;
use crate::options::{validate_time_format, Options, OptionsError};
use crate::record::Record;
use crate::scope::Scope;
use crate::sink::{is_terminal, SharedSink};
use crate::value::Attr;

/// Error type returned by [`Handler::handle`].
#[derive(thiserror::Error, Debug)]
pub enum HandleError {
    #[error("failed to write log line: {0}")]
    Write(#[from] io::Error),
}

/// Capabilities a logging front-end needs from a handler.
///
/// Deriving (`with_group`, `with_attrs`) never changes `self`; the new
/// handler shares the output with it.
pub trait Handler: Send + Sync {
    /// Whether records at `level` should be passed to [`handle`](Handler::handle).
    fn enabled(&self, level: Level) -> bool;

    /// Render `record` and write it out as one line.
    ///
    /// **Returns**
    /// - `Err(HandleError::Write)` if the sink rejected the line.
    fn handle(&self, record: &Record) -> Result<(), HandleError>;

    /// Handler whose later attributes are nested under group `name`.
    fn with_group(&self, name: &str) -> Self
    where
        Self: Sized;

    /// Handler that also emits `attrs` on every record.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Self
    where
        Self: Sized;
}

/// Start of a rendered line, everything before the message.
pub trait Header: Send + Sync + 'static {
    /// Fill in defaults and check `opts` for this style.
    fn prepare(opts: &mut Options) -> Result<(), OptionsError>;

    /// Write the header, including the space before the message.
    fn write(buf: &mut Vec<u8>, colorize: bool, opts: &Options, record: &Record);
}

/// `--> message key=value`: a level glyph, no timestamp.
#[derive(Debug, Clone, Copy)]
pub struct Compact;

impl Header for Compact {
    fn prepare(opts: &mut Options) -> Result<(), OptionsError> {
        if let Some(format) = &opts.time_format {
            validate_time_format(format)?;
        }
        Ok(())
    }

    fn write(buf: &mut Vec<u8>, colorize: bool, _opts: &Options, record: &Record) {
        match record.level {
            Level::INFO => color::write_str(colorize, buf, Color::GREEN, "-->"),
            Level::ERROR => color::write_str(colorize, buf, Color::RED, " ->"),
            Level::WARN => color::write_str(colorize, buf, Color::YELLOW, " ->"),
            Level::DEBUG => color::write_str(colorize, buf, Color::MAGENTA, "[DBG]"),
            _ => {}
        }
        buf.push(b' ');
    }
}

/// `3:04PM INF message key=value`: timestamp and three-letter level.
#[derive(Debug, Clone, Copy)]
pub struct Timestamped;

impl Header for Timestamped {
    fn prepare(opts: &mut Options) -> Result<(), OptionsError> {
        let format = opts.time_format_or_default().to_string();
        validate_time_format(&format)?;
        opts.time_format = Some(format);
        Ok(())
    }

    fn write(buf: &mut Vec<u8>, colorize: bool, opts: &Options, record: &Record) {
        color::write_code(colorize, buf, Color::GREY);
        // `prepare` already rendered this format once.
        let _ = write!(buf, "{}", record.time.format(opts.time_format_or_default()));
        color::write_code(colorize, buf, Color::RESET);
        buf.push(b' ');

        match record.level {
            Level::INFO => color::write_str(colorize, buf, Color::GREEN, "INF"),
            Level::ERROR => color::write_str(colorize, buf, Color::RED, "ERR"),
            Level::WARN => color::write_str(colorize, buf, Color::YELLOW, "WRN"),
            Level::DEBUG => color::write_str(colorize, buf, Color::MAGENTA, "DBG"),
            _ => {}
        }
        buf.push(b' ');
    }
}

/// Human-readable single-line handler writing to `W`.
///
/// Cloning or deriving shares the sink, its lock and the buffer pool;
/// only the accumulated groups/attributes differ.
pub struct PrettyHandler<H, W> {
    sink: SharedSink<W>,
    pool: Arc<BufferPool>,
    scope: Scope,
    colorize: bool,
    options: Arc<Options>,
    _style: std::marker::PhantomData<fn() -> H>,
}

/// Handler printing a level glyph before each message.
pub type CompactHandler<W> = PrettyHandler<Compact, W>;

/// Handler printing a timestamp and level code before each message.
pub type TimestampedHandler<W> = PrettyHandler<Timestamped, W>;

impl<H: Header, W: Write + Send + 'static> PrettyHandler<H, W> {
    /// Create a handler writing to `out`.
    ///
    /// Colors are used if `opts.force_colors` is set or `out` is a terminal;
    /// the decision is made once, here.
    pub fn new(out: W, opts: Options) -> Result<Self, OptionsError> {
        let colorize = opts.force_colors || is_terminal(&out);
        Self::with_colorize(out, opts, colorize)
    }

    /// Create a handler with colorization decided by the caller.
    pub fn with_colorize(out: W, mut opts: Options, colorize: bool) -> Result<Self, OptionsError> {
        H::prepare(&mut opts)?;
        Ok(Self {
            sink: SharedSink::new(out),
            pool: Arc::new(BufferPool::default()),
            scope: Scope::default(),
            colorize,
            options: Arc::new(opts),
            _style: std::marker::PhantomData,
        })
    }
}

impl<H, W> PrettyHandler<H, W> {
    pub fn colorize(&self) -> bool {
        self.colorize
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn sink(&self) -> &SharedSink<W> {
        &self.sink
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    fn derive(&self, scope: Scope) -> Self {
        Self {
            sink: self.sink.clone(),
            pool: Arc::clone(&self.pool),
            scope,
            colorize: self.colorize,
            options: Arc::clone(&self.options),
            _style: std::marker::PhantomData,
        }
    }
}

impl<H: Header, W> PrettyHandler<H, W> {
    /// Render `record` into `buf` without writing it anywhere.
    pub fn render(&self, buf: &mut Vec<u8>, record: &Record) {
        H::write(buf, self.colorize, &self.options, record);
        buf.extend_from_slice(record.message.as_bytes());

        self.scope.write(buf, self.colorize, record.attrs());

        if self.options.show_caller {
            if let Some(caller) = &record.caller {
                buf.push(b' ');
                color::write_code(self.colorize, buf, Color::BOLD_LIGHT_BLUE);
                let _ = write!(buf, "[{}:{}]", caller.file_name(), caller.line);
                color::write_code(self.colorize, buf, Color::RESET);
            }
        }

        buf.push(b'\n');
    }
}

impl<H, W> Clone for PrettyHandler<H, W> {
    fn clone(&self) -> Self {
        self.derive(self.scope.clone())
    }
}

impl<H, W> std::fmt::Debug for PrettyHandler<H, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyHandler")
            .field("style", &std::any::type_name::<H>())
            .field("colorize", &self.colorize)
            .field("options", &self.options)
            .field("scope", &self.scope)
            .finish()
    }
}

impl<H: Header, W: Write + Send> Handler for PrettyHandler<H, W> {
    fn enabled(&self, level: Level) -> bool {
        level >= self.options.level
    }

    fn handle(&self, record: &Record) -> Result<(), HandleError> {
        let mut buf = self.pool.alloc();
        self.render(&mut buf, record);
        let result = self.sink.write_line(&buf);
        self.pool.free(buf);
        result.map_err(HandleError::from)
    }

    fn with_group(&self, name: &str) -> Self {
        self.derive(self.scope.with_group(Cow::Owned(name.to_string())))
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        self.derive(self.scope.with_attrs(attrs))
    }
}
