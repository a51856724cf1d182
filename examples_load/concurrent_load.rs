use std::io;
use std::thread;
use std::time::Instant;

use pretty_log_sink::{Attr, Handler, Level, Options, Record, TimestampedHandler};

fn main() {
    let root = TimestampedHandler::new(io::sink(), Options::default().with_force_colors(true))
        .expect("default options are valid");

    let threads: u64 = 8;
    let per_thread: u64 = 50_000;
    let start = Instant::now();

    let workers: Vec<_> = (0..threads)
        .map(|t| {
            let handler = root.with_attrs(vec![Attr::new("worker", t)]);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let rec = Record::now(Level::WARN, "concurrent load test warning")
                        .with_attr(Attr::new("iteration", i));
                    handler.handle(&rec).expect("io::sink never fails");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let n = threads * per_thread;
    let elapsed = start.elapsed();
    println!("{} threads: rendered {} colored lines in {:?} (~{:.0} lines/s), {} buffer allocation(s)",
        threads,
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        root.pool().allocations()
    );
}
