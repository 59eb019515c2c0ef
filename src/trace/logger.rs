use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::warn;

use crate::trace::trace::TraceEvent;

/// Hex digits of the scope fingerprint used to group one attempt's lines.
const ATTEMPT_KEY_LEN: usize = 12;

enum Sink {
    Off,
    File(Mutex<BufWriter<File>>),
}

/// One JSONL line: the event plus its position in the trail.
#[derive(Serialize)]
struct TraceLine<'a> {
    seq: u64,
    attempt: Option<&'a str>,
    #[serde(flatten)]
    event: &'a TraceEvent,
}

/// Append-only JSONL trail of tracker decisions.
///
/// Every line is flushed as soon as it is written, so a trail read while the
/// tracker is still running ends on a complete event.
pub struct TraceLogger {
    sink: Sink,
    seq: AtomicU64,
}

impl TraceLogger {
    /// Open `path` for appending. Failure is logged and yields a disabled logger.
    pub fn new(path: &str) -> Self {
        Self::create(path).unwrap_or_else(|e| {
            warn!(path, error = %e, "could not open trace file, tracing disabled");
            Self::disabled()
        })
    }

    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            sink: Sink::File(Mutex::new(BufWriter::new(file))),
            seq: AtomicU64::new(0),
        })
    }

    pub fn disabled() -> Self {
        Self {
            sink: Sink::Off,
            seq: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.sink, Sink::File(_))
    }

    pub fn log(&self, event: &TraceEvent) {
        let Sink::File(writer) = &self.sink else {
            return;
        };

        let mut writer = match writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        let line = TraceLine {
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            attempt: event
                .scope_fingerprint
                .as_deref()
                .map(|fp| &fp[..fp.len().min(ATTEMPT_KEY_LEN)]),
            event,
        };
        let written = serde_json::to_writer(&mut *writer, &line)
            .map_err(io::Error::other)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(e) = written {
            warn!(trigger = %event.trigger, error = %e, "failed to write trace event");
        }
    }
}
