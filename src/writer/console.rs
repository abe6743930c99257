use super::fanout::Sink;
use std::io::{self, Stdout, Write};

pub const FALLBACK_WIDTH: usize = 80;

/// Status line that overwrites itself on every row.
///
/// Rows end with a carriage return so the next one lands on the same line;
/// the previous content is blanked first with a full terminal width of spaces.
pub struct ConsoleSink<W: Write = Stdout> {
    out: W,
    width: Option<usize>,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: io::stdout(),
            width: None,
        }
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Console writing to `out`. A fixed `width` skips terminal detection.
    pub fn new(out: W, width: Option<usize>) -> Self {
        Self { out, width }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn width(&self) -> usize {
        self.width.unwrap_or_else(terminal_width)
    }

    fn erase_line(&mut self) -> io::Result<()> {
        let blank = " ".repeat(self.width());
        write!(self.out, "{}\r", blank)
    }
}

/// Current terminal width: the tty itself, then `$COLUMNS`, then 80.
pub fn terminal_width() -> usize {
    if let Ok((columns, _)) = crossterm::terminal::size()
        && columns > 0
    {
        return columns as usize;
    }
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse().ok())
        .filter(|&c| c > 0)
        .unwrap_or(FALLBACK_WIDTH)
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.erase_line()?;
        write!(self.out, "{}\r", line)?;
        self.out.flush()
    }

    fn write_header(&mut self, line: &str) -> io::Result<()> {
        self.erase_line()?;
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }
}
