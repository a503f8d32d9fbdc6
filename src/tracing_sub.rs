//! Wires `tracing` output to wherever the active desktop can show it.

use std::io::{self, Write};

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::fmt::{MakeWriter, SubscriberBuilder};

use crate::debug_log::{DebugLogWriter, global_debug_log};

/// Destination for one formatted event.
enum LogSink {
    Buffer(DebugLogWriter),
    Stderr(io::Stderr),
}

impl LogSink {
    /// The debug log buffer once the terminal desktop has installed one.
    fn current() -> Self {
        match global_debug_log() {
            Some(handle) => LogSink::Buffer(handle.writer()),
            None => LogSink::Stderr(io::stderr()),
        }
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::Buffer(w) => w.write(buf),
            LogSink::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::Buffer(w) => w.flush(),
            LogSink::Stderr(s) => s.flush(),
        }
    }
}

fn builder<W>(max_level: Level, writer: W) -> SubscriberBuilder<DefaultFields, Format, LevelFilter, W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(writer)
        .with_target(false)
}

/// Initialize the tracing subscriber. Later calls are no-ops.
pub fn init(max_level: Level) {
    let _ = builder(max_level, LogSink::current)
        .with_ansi(global_debug_log().is_none())
        .try_init();
}
