pub mod console;
pub mod csv;
pub mod fanout;

pub use console::ConsoleSink;
pub use csv::CsvSink;
pub use fanout::{FIELD_SEPARATOR, Sink, WriterFanout};
