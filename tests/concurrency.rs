use pretty_log_sink::{Attr, CompactHandler, Handler, Level, Options, Record};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;

/// Writer that accepts one byte per call and yields in between, so any
/// unguarded concurrent writer would interleave character by character.
#[derive(Clone, Default)]
struct TrickleWriter {
    out: Arc<Mutex<Vec<u8>>>,
}

impl Write for TrickleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(&b) = buf.first() else {
            return Ok(0);
        };
        self.out.lock().unwrap().push(b);
        thread::yield_now();
        Ok(1)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn derived_handlers_never_interleave_lines() {
    const THREADS: usize = 8;
    const LINES: usize = 50;

    let writer = TrickleWriter::default();
    let captured = Arc::clone(&writer.out);
    let root = CompactHandler::new(writer, Options::default()).unwrap();

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let handler = root
                .with_group(&format!("worker{t}"))
                .with_attrs(vec![Attr::new("thread", t)]);
            thread::spawn(move || {
                for i in 0..LINES {
                    let rec = Record::now(Level::INFO, "tick").with_attr(Attr::new("i", i));
                    handler.handle(&rec).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let out = String::from_utf8(captured.lock().unwrap().clone()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), THREADS * LINES);

    for t in 0..THREADS {
        let mine: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|line| line.contains(&format!("worker{t}.thread={t} ")))
            .collect();
        assert_eq!(mine.len(), LINES);
        for (i, line) in mine.iter().enumerate() {
            assert_eq!(*line, format!("--> tick worker{t}.thread={t} worker{t}.i={i}"));
        }
    }
}

#[test]
fn every_descendant_shares_one_sink() {
    let root = CompactHandler::new(Vec::new(), Options::default()).unwrap();
    let a = root.with_group("a");
    let b = a.with_attrs(vec![Attr::new("k", 1)]).with_group("b");
    let clone = b.clone();
    for handler in [&a, &b, &clone] {
        assert!(root.sink().same_sink(handler.sink()));
    }
}
