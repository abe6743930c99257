use std::io;

/// Separator between fields of the lines handed to sinks. Every field,
/// including the last, is followed by one.
pub const FIELD_SEPARATOR: char = '\t';

/// Destination for monitor output lines.
pub trait Sink {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Write the column header. Defaults to a regular line.
    fn write_header(&mut self, line: &str) -> io::Result<()> {
        self.write_line(line)
    }
}

/// Broadcasts every line to all sinks, in registration order.
///
/// A failing sink is logged and skipped for that line only.
#[derive(Default)]
pub struct WriterFanout {
    sinks: Vec<Box<dyn Sink>>,
}

impl WriterFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: impl Sink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    #[must_use]
    pub fn with(mut self, sink: impl Sink + 'static) -> Self {
        self.add(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn header<S: AsRef<str>>(&mut self, aliases: &[S]) {
        let line = format_line("timestamp", aliases);
        for sink in &mut self.sinks {
            if let Err(e) = sink.write_header(&line) {
                tracing::warn!("Failed to write header to {}: {}", sink.name(), e);
            }
        }
    }

    pub fn row<S: AsRef<str>>(&mut self, timestamp_millis: i64, values: &[S]) {
        let line = format_line(&timestamp_millis.to_string(), values);
        for sink in &mut self.sinks {
            if let Err(e) = sink.write_line(&line) {
                tracing::warn!("Failed to write row to {}: {}", sink.name(), e);
            }
        }
    }
}

fn format_line<S: AsRef<str>>(first: &str, fields: &[S]) -> String {
    let mut line = String::with_capacity(16 * (fields.len() + 1));
    line.push_str(first);
    line.push(FIELD_SEPARATOR);
    for field in fields {
        line.push_str(field.as_ref());
        line.push(FIELD_SEPARATOR);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recording {
        name: &'static str,
        lines: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl Sink for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn write_line(&mut self, line: &str) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::other("disk full"));
            }
            self.lines.borrow_mut().push(line.to_string());
            Ok(())
        }
    }

    fn recording(name: &'static str, fail: bool) -> (Recording, Rc<RefCell<Vec<String>>>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Recording {
            name,
            lines: lines.clone(),
            fail,
        };
        (sink, lines)
    }

    #[test]
    fn formats_header_and_row() {
        let (sink, lines) = recording("rec", false);
        let mut fanout = WriterFanout::new().with(sink);

        fanout.header(&["Heap", "ThreadCount"]);
        fanout.row(1700000000000, &["42".to_string(), String::new()]);

        assert_eq!(
            *lines.borrow(),
            vec![
                "timestamp\tHeap\tThreadCount\t".to_string(),
                "1700000000000\t42\t\t".to_string(),
            ]
        );
    }

    #[test]
    fn failing_sink_does_not_stop_the_others() {
        let (first, first_lines) = recording("first", false);
        let (broken, _) = recording("broken", true);
        let (last, last_lines) = recording("last", false);
        let mut fanout = WriterFanout::new().with(first).with(broken).with(last);
        assert_eq!(fanout.len(), 3);

        fanout.row(1, &["a", "b"]);
        fanout.row(2, &["c", "d"]);

        let expected = vec!["1\ta\tb\t".to_string(), "2\tc\td\t".to_string()];
        assert_eq!(*first_lines.borrow(), expected);
        assert_eq!(*last_lines.borrow(), expected);
    }
}
