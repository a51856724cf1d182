use pretty_log_sink::init::{subscriber, LayerConfig, Style};
use pretty_log_sink::{CompactHandler, Level, Options};
use std::fmt;
use tracing::{debug, error, info, info_span, trace, warn};

#[derive(Debug)]
struct Refused;

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("connection refused")
    }
}

impl std::error::Error for Refused {}

fn capture(opts: Options, body: impl FnOnce()) -> String {
    let handler = CompactHandler::new(Vec::new(), opts).unwrap();
    tracing::subscriber::with_default(subscriber(handler.clone()), body);
    let out = handler.sink().lock().clone();
    String::from_utf8(out).unwrap()
}

#[test]
fn events_render_with_typed_fields() {
    let out = capture(Options::default(), || {
        info!(port = 8080, tls = false, ratio = 0.25, name = "api", "started");
    });
    assert_eq!(out, "--> started port=8080 tls=false ratio=0.25 name=\"api\"\n");
}

#[test]
fn events_below_threshold_are_dropped() {
    let out = capture(Options::default().with_level(Level::WARN), || {
        debug!("hidden");
        info!("hidden too");
        warn!("shown");
    });
    assert_eq!(out, " -> shown\n");
}

#[test]
fn error_fields_keep_error_coloring() {
    let out = capture(Options::default().with_force_colors(true), || {
        let err = Refused;
        error!(err = &err as &(dyn std::error::Error + 'static), "dial failed");
    });
    assert!(out.contains("\x1b[31merr=\x1b[0m\x1b[91m\"connection refused\"\x1b[0m"));
}

#[test]
fn trace_events_render_with_blank_glyph() {
    let out = capture(Options::default().with_level(Level(-8)), || {
        trace!(step = 1, "scanning");
        debug!("debugging");
    });
    assert_eq!(out, " scanning step=1\n[DBG] debugging\n");
}

#[test]
fn spans_become_groups() {
    let out = capture(Options::default(), || {
        let request = info_span!("request", id = 7);
        let _outer = request.enter();
        let db = info_span!("db");
        let _inner = db.enter();
        info!(rows = 3u64, "query");
    });
    assert_eq!(out, "--> query request.id=7 request.db.rows=3\n");
}

#[test]
fn late_span_fields_are_bound() {
    let out = capture(Options::default(), || {
        let span = info_span!("job", status = tracing::field::Empty);
        let _guard = span.enter();
        span.record("status", "done");
        info!("finished");
    });
    assert_eq!(out, "--> finished job.status=\"done\"\n");
}

#[test]
fn caller_comes_from_event_metadata() {
    let out = capture(Options::default().with_caller(true), || {
        info!("here");
    });
    assert!(out.starts_with("--> here [tracing_layer.rs:"), "{out}");
    assert!(out.ends_with("]\n"));
}

#[test]
fn layer_config_deserializes() {
    let config: LayerConfig = serde_json::from_str(
        r#"{"style": "timestamped", "options": {"level": "debug", "time_format": "%H:%M"}}"#,
    )
    .unwrap();
    assert_eq!(config.style, Style::Timestamped);
    assert_eq!(config.options.level, Level::DEBUG);
    assert_eq!(config.options.time_format.as_deref(), Some("%H:%M"));
}
