//! Processing handlers for queue items.
//!
//! [`Dispatcher::process`] is the function handed to the queue. It matches on
//! the item variant and calls the file or console sink. Both sinks serialize
//! their own writes, so they stay correct even if several lanes share them.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use tracing::trace;

use crate::model::{ConsoleItem, ConsoleWritten, FileItem, FileWritten, QueueItem, QueueResponse};

/// Appends lines to a file.
pub struct FileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `item.message` plus a newline. Empty messages write nothing.
    pub fn write(&self, item: &FileItem) -> anyhow::Result<FileWritten> {
        if item.message.is_empty() {
            return Ok(FileWritten { bytes: 0 });
        }

        let line = format!("{}\n", item.message);
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("append to {}", self.path.display()))?;

        trace!(path = %self.path.display(), bytes = line.len(), "file line appended");
        Ok(FileWritten { bytes: line.len() })
    }
}

/// Writes lines to the console, or any other writer.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn write(&self, item: &ConsoleItem) -> anyhow::Result<ConsoleWritten> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{}", item.message).context("write to console")?;
        out.flush().context("flush console")?;
        Ok(ConsoleWritten)
    }
}

/// Routes each item to the sink for its kind.
pub struct Dispatcher {
    file: FileSink,
    console: ConsoleSink,
}

impl Dispatcher {
    pub fn new(file: FileSink, console: ConsoleSink) -> Self {
        Self { file, console }
    }

    pub fn process(&self, item: QueueItem) -> anyhow::Result<QueueResponse> {
        match item {
            QueueItem::File(item) => self.file.write(&item).map(QueueResponse::File),
            QueueItem::Console(item) => self.console.write(&item).map(QueueResponse::Console),
        }
    }
}
