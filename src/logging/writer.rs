//! Output destinations for encoded log lines.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// A destination that accepts complete, newline-terminated log lines.
pub trait LogWriter: Send + Sync {
    /// Write one encoded line. An empty slice is a writability probe.
    fn write_line(&self, line: &[u8]) -> io::Result<usize>;

    /// Flush buffered data to durable storage.
    fn sync(&self) -> io::Result<()>;

    /// Release the destination. Later writes may fail.
    fn close(&self) -> io::Result<()> {
        self.sync()
    }
}

/// Writes to the process's standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleWriter;

impl LogWriter for ConsoleWriter {
    fn write_line(&self, line: &[u8]) -> io::Result<usize> {
        let mut out = io::stdout().lock();
        out.write_all(line)?;
        Ok(line.len())
    }

    fn sync(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }

    fn close(&self) -> io::Result<()> {
        // stdout outlives the logger
        self.sync()
    }
}

/// Fans every line out to several writers.
///
/// Each writer is attempted even if an earlier one fails; the first error is
/// reported.
pub struct MultiWriter {
    writers: Vec<Arc<dyn LogWriter>>,
}

impl MultiWriter {
    pub fn new(writers: Vec<Arc<dyn LogWriter>>) -> Self {
        Self { writers }
    }

    fn for_each<F>(&self, mut op: F) -> io::Result<()>
    where
        F: FnMut(&dyn LogWriter) -> io::Result<()>,
    {
        let mut first_err = None;
        for writer in &self.writers {
            if let Err(e) = op(writer.as_ref()) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl LogWriter for MultiWriter {
    fn write_line(&self, line: &[u8]) -> io::Result<usize> {
        self.for_each(|w| w.write_line(line).map(|_| ()))?;
        Ok(line.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.for_each(|w| w.sync())
    }

    fn close(&self) -> io::Result<()> {
        self.for_each(|w| w.close())
    }
}

/// In-memory writer for capturing output in tests and diagnostics.
#[derive(Debug, Default, Clone)]
pub struct BufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Captured output split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Captured JSON lines, parsed. Lines that are not JSON are skipped.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl LogWriter for BufferWriter {
    fn write_line(&self, line: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(line);
        Ok(line.len())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}
