//! Line sinks for JSON metric output.

use std::io::Write;

/// A sink that receives pre-formatted log lines.
pub trait LogSink: Send + Sync {
    /// Write a line to the sink.
    fn write_line(&self, line: &str);
}

/// Log sink that writes to stdout; lines from concurrent writers never interleave.
#[derive(Debug, Default)]
pub struct StdoutLogSink;

impl LogSink for StdoutLogSink {
    fn write_line(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(error) = stdout.write_all(line.as_bytes()) {
            eprintln!("log sink write failed: {error}");
        }
    }
}
