//! Tracing output for the demo and the CLI.
//!
//! Log lines go to an in-memory ring buffer when one is installed (the demo
//! shows it in a dockable while the terminal is in raw mode) and to stderr
//! otherwise.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;

const DEFAULT_MAX_LINES: usize = 500;

static GLOBAL_LOG: OnceLock<LogHandle> = OnceLock::new();

pub fn set_global_log(handle: LogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_log() -> Option<LogHandle> {
    GLOBAL_LOG.get().cloned()
}

#[derive(Debug)]
struct LogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LogBuffer {
    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogHandle {
    inner: Arc<Mutex<LogBuffer>>,
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl LogHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogBuffer {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
            })),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    /// The newest `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        match self.inner.lock() {
            Ok(buffer) => {
                let skip = buffer.lines.len().saturating_sub(count);
                buffer.lines.iter().skip(skip).cloned().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn writer(&self) -> LogWriter {
        LogWriter {
            handle: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// Splits written bytes into lines; a partial line waits for its newline or
/// a flush.
#[derive(Debug)]
pub struct LogWriter {
    handle: LogHandle,
    pending: Vec<u8>,
}

impl LogWriter {
    fn push_complete_lines(&mut self) {
        let Some(pos) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return;
        };
        let drained: Vec<u8> = self.pending.drain(..=pos).collect();
        for line in String::from_utf8_lossy(&drained).split('\n') {
            if !line.is_empty() {
                self.handle.push(line);
            }
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.push_complete_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let text = String::from_utf8_lossy(&self.pending).to_string();
            self.pending.clear();
            self.handle.push(text);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

pub enum DelegatingWriter {
    Buffer(LogWriter),
    Stderr(io::Stderr),
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            DelegatingWriter::Buffer(w) => w.write(buf),
            DelegatingWriter::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            DelegatingWriter::Buffer(w) => w.flush(),
            DelegatingWriter::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SubscriberMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match global_log() {
            Some(handle) => DelegatingWriter::Buffer(handle.writer()),
            None => DelegatingWriter::Stderr(io::stderr()),
        }
    }
}

/// Installs a compact subscriber at `level`. Later calls are no-ops.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(SubscriberMakeWriter)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .without_time()
        .try_init();
}

pub fn init_default() {
    init(Level::DEBUG);
}
