pub mod level;
pub mod value;
pub mod record;

pub mod color;
pub mod buffer;
pub mod attr_writer;
pub mod scope;
pub mod sink;
pub mod handler;

pub mod options;
pub mod env;
pub mod layer;
pub mod init;

pub use handler::{
    CompactHandler, Compact, HandleError, Handler, PrettyHandler, Timestamped, TimestampedHandler,
};
pub use level::Level;
pub use options::Options;
pub use record::{Caller, Record};
pub use value::{Attr, Value};
