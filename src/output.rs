use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::entry::Entry;
use crate::formatter::Formatter;
use crate::level::Level;
use crate::logger::Logger;

/// Destination for formatted log lines: a writer, a minimum level and the
/// formatter that renders entries.
///
/// Formatting is synchronous and stateless; the only lock is around the
/// writer so concurrent callers cannot interleave partial lines. The
/// formatter is frozen once the output is constructed.
pub struct LogOutput {
    formatter: Formatter,
    level: Level,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LogOutput {
    pub fn new(writer: Box<dyn Write + Send>, level: Level, formatter: Formatter) -> Arc<Self> {
        Arc::new(LogOutput {
            formatter,
            level,
            writer: Mutex::new(writer),
        })
    }

    /// Output writing to standard out.
    pub fn stdout(level: Level, formatter: Formatter) -> Arc<Self> {
        Self::new(Box::new(std::io::stdout()), level, formatter)
    }

    /// Named logger handle bound to this output.
    pub fn logger(self: &Arc<Self>, name: impl Into<String>) -> Logger {
        Logger::new(name, Arc::clone(self))
    }

    /// Whether a record at `level` would be emitted at all. Callers are
    /// expected to check this before building a record.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Format and write one entry. Entries below the threshold produce
    /// zero output bytes. Failures are reported on stderr; the logging
    /// call site never sees them.
    pub fn log(&self, entry: &Entry) {
        if !self.enabled(entry.level) {
            return;
        }
        match self.formatter.format(entry) {
            Ok(line) => {
                let mut writer = match self.writer.lock() {
                    Ok(writer) => writer,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if let Err(e) = writer.write_all(&line) {
                    eprintln!("steno-log: failed to write log line: {}", e);
                }
            }
            Err(e) => eprintln!("steno-log: failed to format log line: {}", e),
        }
    }

    /// Flush the underlying writer, if it buffers.
    pub fn flush(&self) {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writer.flush() {
            eprintln!("steno-log: failed to flush log output: {}", e);
        }
    }
}
