//! Logging setup for the console.
//!
//! # Design
//! - Library code only emits `tracing` events; the entry point installs the subscriber.
//! - Formatted lines are handed to a sink so the same writer serves the browser
//!   console and native tests.

use crate::config::LogLevel;
use std::io;

/// Receives one formatted log line.
pub type LineSink = fn(&str);

/// Subscriber installation failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to install log subscriber: {0}")]
pub struct TelemetryError(String);

/// Buffers one formatted event and forwards it to a sink on flush or drop.
pub struct ConsoleWriter {
    buffer: Vec<u8>,
    sink: LineSink,
}

impl ConsoleWriter {
    /// Writer targeting `sink`.
    #[must_use]
    pub const fn new(sink: LineSink) -> Self {
        Self {
            buffer: Vec::new(),
            sink,
        }
    }

    fn emit(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer);
        (self.sink)(line.trim_end());
        self.buffer.clear();
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

/// Install the global fmt subscriber writing through `sink`.
///
/// # Errors
/// Returns [`TelemetryError`] when a global subscriber is already installed.
pub fn init_logging(level: LogLevel, sink: LineSink) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_max_level(level.as_tracing())
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_writer(move || ConsoleWriter::new(sink))
        .try_init()
        .map_err(|err| TelemetryError(err.to_string()))
}

/// Sink that forwards lines to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn browser_console(line: &str) {
    gloo::console::log!(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;

    thread_local! {
        static LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn capture(line: &str) {
        LINES.with(|lines| lines.borrow_mut().push(line.to_string()));
    }

    #[test]
    fn writer_emits_one_trimmed_line_per_event() {
        {
            let mut writer = ConsoleWriter::new(capture);
            write!(writer, " INFO signed in").expect("write");
            writer.write_all(b" role=Admin\n").expect("write");
        }
        let mut writer = ConsoleWriter::new(capture);
        writer.flush().expect("flush");
        drop(writer);

        LINES.with(|lines| {
            assert_eq!(*lines.borrow(), vec![" INFO signed in role=Admin".to_string()]);
        });
    }
}
