use pretty_log_sink::buffer::{BufferPool, MAX_POOLED_CAPACITY};
use pretty_log_sink::{Attr, CompactHandler, Handler, Level, Options, Record};

#[test]
fn sequential_handles_reuse_one_buffer() {
    let handler = CompactHandler::new(Vec::new(), Options::default()).unwrap();
    let child = handler.with_group("req");

    for i in 0..200 {
        let rec = Record::now(Level::INFO, "served").with_attr(Attr::new("n", i));
        child.handle(&rec).unwrap();
    }

    assert_eq!(handler.pool().allocations(), 1);
    assert_eq!(handler.pool().idle(), 1);
}

#[test]
fn oversized_lines_are_not_retained() {
    let handler = CompactHandler::new(Vec::new(), Options::default()).unwrap();
    let huge = "x".repeat(MAX_POOLED_CAPACITY * 2);

    handler
        .handle(&Record::now(Level::INFO, "big").with_attr(Attr::new("blob", huge)))
        .unwrap();
    assert_eq!(handler.pool().idle(), 0);

    for _ in 0..10 {
        handler.handle(&Record::now(Level::INFO, "small")).unwrap();
    }
    assert_eq!(handler.pool().allocations(), 2);
    assert_eq!(handler.pool().idle(), 1);
}

#[test]
fn standalone_pool_is_bounded() {
    let pool = BufferPool::new(4);
    let held: Vec<_> = (0..16).map(|_| pool.alloc()).collect();
    assert_eq!(pool.allocations(), 16);
    for buf in held {
        pool.free(buf);
    }
    assert_eq!(pool.idle(), 4);
}
