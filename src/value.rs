use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Upper bound on chained [`LogValuer`] resolutions before giving up.
const MAX_RESOLVE_DEPTH: usize = 100;

/// A value whose log representation is computed only when it is rendered.
///
/// Implementations should be cheap and side-effect free; the renderer
/// calls [`log_value`](LogValuer::log_value) once per emitted record.
pub trait LogValuer: Send + Sync {
    fn log_value(&self) -> Value;
}

impl<F> LogValuer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn log_value(&self) -> Value {
        self()
    }
}

/// Error value produced when a chain of [`LogValuer`]s does not settle.
#[derive(thiserror::Error, Debug)]
#[error("log_value resolved to another lazy value {MAX_RESOLVE_DEPTH} times")]
pub struct ResolveError;

/// Value half of an [`Attr`].
#[derive(Clone, Default)]
pub enum Value {
    /// The zero value. Only an attribute with an empty key *and* this value
    /// is considered empty and skipped.
    #[default]
    Empty,
    Int64(i64),
    Uint64(u64),
    Float64(f64),
    Bool(bool),
    Duration(TimeDelta),
    Time(DateTime<FixedOffset>),
    String(Cow<'static, str>),
    Group(Vec<Attr>),
    Any(Arc<dyn fmt::Display + Send + Sync>),
    Error(Arc<dyn StdError + Send + Sync>),
    Lazy(Arc<dyn LogValuer>),
}

impl Value {
    /// Resolve [`Value::Lazy`] references until a concrete value is reached.
    ///
    /// Non-lazy values are returned unchanged, so resolving twice is a no-op.
    pub fn resolve(self) -> Value {
        let mut value = self;
        for _ in 0..MAX_RESOLVE_DEPTH {
            match value {
                Value::Lazy(valuer) => value = valuer.log_value(),
                other => return other,
            }
        }
        match value {
            Value::Lazy(_) => Value::Error(Arc::new(ResolveError)),
            other => other,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn group(attrs: Vec<Attr>) -> Value {
        Value::Group(attrs)
    }

    pub fn any<T: fmt::Display + Send + Sync + 'static>(value: T) -> Value {
        Value::Any(Arc::new(value))
    }

    pub fn error<E: StdError + Send + Sync + 'static>(err: E) -> Value {
        Value::Error(Arc::new(err))
    }

    pub fn lazy<L: LogValuer + 'static>(valuer: L) -> Value {
        Value::Lazy(Arc::new(valuer))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("Empty"),
            Value::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            Value::Uint64(v) => f.debug_tuple("Uint64").field(v).finish(),
            Value::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            Value::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Value::String(v) => f.debug_tuple("String").field(v).finish(),
            Value::Group(v) => f.debug_tuple("Group").field(v).finish(),
            Value::Any(v) => f.debug_tuple("Any").field(&v.to_string()).finish(),
            Value::Error(v) => f.debug_tuple("Error").field(&v.to_string()).finish(),
            Value::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

macro_rules! value_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

value_from!(Int64 as i64: i8, i16, i32, i64);
value_from!(Uint64 as u64: u8, u16, u32, u64);
value_from!(Float64 as f64: f32, f64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint64(v as u64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&'static str> for Value {
    fn from(v: &'static str) -> Self {
        Value::String(Cow::Borrowed(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Cow::Owned(v))
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Value::Duration(v)
    }
}

impl From<std::time::Duration> for Value {
    fn from(v: std::time::Duration) -> Self {
        // Saturate like a 64-bit nanosecond counter would.
        Value::Duration(TimeDelta::from_std(v).unwrap_or_else(|_| TimeDelta::MAX))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::Time(v.fixed_offset())
    }
}

impl From<Vec<Attr>> for Value {
    fn from(v: Vec<Attr>) -> Self {
        Value::Group(v)
    }
}

/// A key/value pair attached to a record or bound to a handler.
#[derive(Clone, Debug, Default)]
pub struct Attr {
    pub key: Cow<'static, str>,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Named group whose children render as `key.child=...`.
    pub fn group(key: impl Into<Cow<'static, str>>, attrs: Vec<Attr>) -> Self {
        Attr::new(key, Value::Group(attrs))
    }

    pub fn error<E>(key: impl Into<Cow<'static, str>>, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Attr::new(key, Value::error(err))
    }

    pub fn any<T>(key: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Attr::new(key, Value::any(value))
    }

    pub fn lazy<L: LogValuer + 'static>(key: impl Into<Cow<'static, str>>, valuer: L) -> Self {
        Attr::new(key, Value::lazy(valuer))
    }

    /// True for the zero attribute: no key and no value.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && matches!(self.value, Value::Empty)
    }
}
