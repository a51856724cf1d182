use std::io;
use std::time::Duration;

use pretty_log_sink::{Attr, Caller, CompactHandler, Handler, Level, Options, Record, Value};

#[derive(Debug)]
struct NotFound(&'static str);

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found", self.0)
    }
}

impl std::error::Error for NotFound {}

fn main() {
    // Colors are picked automatically when stdout is a terminal.
    let options = Options::default().with_level(Level::DEBUG).with_caller(true);
    let log = CompactHandler::new(io::stdout(), options).expect("valid options");

    let fetch = log.with_group("fetch").with_attrs(vec![Attr::new("url", "https://example.org")]);

    let records = [
        Record::now(Level::INFO, "starting").with_attr(Attr::new("version", "0.1.1")),
        Record::now(Level::DEBUG, "resolved mirrors").with_attr(Attr::new("count", 3)),
        Record::now(Level::WARN, "slow response")
            .with_attr(Attr::new("took", Duration::from_millis(1500)))
            .with_attr(Attr::lazy("stats", || {
                Value::group(vec![Attr::new("retries", 2), Attr::new("ratio", 0.66)])
            })),
        Record::now(Level::ERROR, "download failed")
            .with_attr(Attr::error("err", NotFound("package.tar.gz")))
            .with_caller(Caller::here()),
    ];

    for rec in &records {
        if fetch.enabled(rec.level) {
            fetch.handle(rec).expect("stdout is writable");
        }
    }
}
