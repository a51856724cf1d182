use chrono::Local;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{span, Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::{LookupSpan, SpanRef};

use crate::handler::Handler;
use crate::level::Level;
use crate::record::{Caller, Record};
use crate::value::Attr;

/// `tracing_subscriber` layer that renders events through a [`Handler`].
///
/// Every span derives a handler from its parent's: the span name becomes a
/// group and its fields become bound attributes, so an event inside
/// `request{id=7}` renders `request.id=7` after its own fields. Rendering
/// happens on the thread that emitted the event.
pub struct PrettyLayer<H> {
    handler: H,
}

impl<H> PrettyLayer<H>
where
    H: Handler + Clone + 'static,
{
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

/// Handler derived for a span, kept in the span's extensions.
struct SpanHandler<H>(H);

impl<S, H> Layer<S> for PrettyLayer<H>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    H: Handler + Clone + 'static,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let parent = span
            .parent()
            .and_then(|parent| stored_handler::<S, H>(&parent))
            .unwrap_or_else(|| self.handler.clone());

        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        let handler = parent.with_group(span.name()).with_attrs(visitor.into_attrs());

        span.extensions_mut().insert(SpanHandler(handler));
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);
        let attrs = visitor.into_attrs();
        if attrs.is_empty() {
            return;
        }

        let mut extensions = span.extensions_mut();
        if let Some(SpanHandler(handler)) = extensions.get_mut::<SpanHandler<H>>() {
            *handler = handler.with_attrs(attrs);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = Level::from(*meta.level());

        let scoped = ctx
            .event_span(event)
            .and_then(|span| stored_handler::<S, H>(&span));
        let handler = scoped.as_ref().unwrap_or(&self.handler);
        if !handler.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let caller = meta.file().zip(meta.line()).map(|(file, line)| Caller::new(file, line));
        let mut record = Record::new(
            Local::now().fixed_offset(),
            level,
            visitor.message.take().unwrap_or_default(),
            caller,
        );
        record.add_attrs(visitor.attrs);

        // The layer cannot report through tracing itself.
        if let Err(e) = handler.handle(&record) {
            eprintln!("pretty-log-sink: dropping log line: {}", e);
        }
    }
}

fn stored_handler<'a, S, H>(span: &SpanRef<'a, S>) -> Option<H>
where
    S: LookupSpan<'a>,
    H: Clone + 'static,
{
    let extensions = span.extensions();
    extensions.get::<SpanHandler<H>>().map(|h| h.0.clone())
}

/// Error recorded through [`Visit::record_error`], kept as its message so
/// it still renders with error coloring.
#[derive(thiserror::Error, Debug)]
#[error("{0}")]
struct CapturedError(String);

/// Collects event or span fields as typed [`Attr`]s.
///
/// The `message` field is pulled out separately.
#[derive(Default)]
pub struct FieldVisitor {
    pub attrs: Vec<Attr>,
    pub message: Option<String>,
}

impl FieldVisitor {
    /// All collected fields, with `message` (if any) as a regular attribute.
    pub fn into_attrs(mut self) -> Vec<Attr> {
        if let Some(message) = self.message.take() {
            self.attrs.insert(0, Attr::new("message", message));
        }
        self.attrs
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.attrs.push(Attr::new(field.name(), value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.attrs
            .push(Attr::error(field.name(), CapturedError(value.to_string())));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.attrs.push(Attr::new(field.name(), format!("{:?}", value)));
        }
    }
}
