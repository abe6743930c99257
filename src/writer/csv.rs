use super::fanout::{FIELD_SEPARATOR, Sink};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const CSV_SEPARATOR: &str = ",";

/// Appends every line to a CSV file, flushing after each one.
///
/// Fields are not quoted: values containing a comma will shift columns.
pub struct CsvSink {
    path: PathBuf,
    name: String,
    writer: BufWriter<File>,
}

impl CsvSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            name: format!("csv:{}", path.display()),
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Turn a tab separated line into a CSV record, dropping one trailing
/// separator.
pub fn to_csv_line(line: &str) -> String {
    let mut csv = line.replace(FIELD_SEPARATOR, CSV_SEPARATOR);
    if csv.ends_with(CSV_SEPARATOR) {
        csv.pop();
    }
    csv.push('\n');
    csv
}

impl Sink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(to_csv_line(line).as_bytes())?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_tabs_and_strips_one_trailing_separator() {
        assert_eq!(to_csv_line("a\tb\tc\t"), "a,b,c\n");
        assert_eq!(to_csv_line("a\tb"), "a,b\n");
        assert_eq!(to_csv_line("a\t\t"), "a,\n");
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "previous\n").unwrap();

        let mut sink = CsvSink::open(&path).unwrap();
        sink.write_header("timestamp\tHeap\t").unwrap();
        sink.write_line("a\tb\tc\t").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "previous\ntimestamp,Heap\na,b,c\n"
        );
    }

    #[test]
    fn creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.csv");

        let mut sink = CsvSink::open(&path).unwrap();
        sink.write_line("1\t\t").unwrap();
        assert_eq!(sink.name(), format!("csv:{}", path.display()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1,\n");
    }
}
