use std::io;
use std::time::Instant;

use pretty_log_sink::{Attr, CompactHandler, Handler, Level, Options, Record};

fn main() {
    // io::sink() is not a terminal, so this measures the plain rendering path.
    let handler = CompactHandler::new(io::sink(), Options::default())
        .expect("default options are valid")
        .with_group("load")
        .with_attrs(vec![Attr::new("run", "default")]);

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let rec = Record::now(Level::ERROR, "default load test error")
            .with_attr(Attr::new("iteration", i));
        handler.handle(&rec).expect("io::sink never fails");
    }

    let elapsed = start.elapsed();
    println!("default config: rendered {} lines in {:?} (~{:.0} lines/s), {} buffer allocation(s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        handler.pool().allocations()
    );
}
