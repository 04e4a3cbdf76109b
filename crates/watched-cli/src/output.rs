use std::io::{self, Write};
use watched_models::WatchedItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
}

/// Stdout writer; the watched items array is the only thing printed there
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn items(&self, items: &[WatchedItem]) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_items(&mut handle, items)?;
        handle.flush()
    }

    pub fn write_items<W: Write>(&self, writer: &mut W, items: &[WatchedItem]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => serde_json::to_writer(&mut *writer, items)?,
            OutputFormat::JsonPretty => serde_json::to_writer_pretty(&mut *writer, items)?,
        }
        writeln!(writer)
    }
}
