//! JSONL structured logging for harness runs.
//!
//! Each [`LogEntry`] serializes to one JSON object per line. Entries without a
//! trace id get `<run_id>::<seq>` assigned by the [`LogEmitter`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
}

/// One structured log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    #[must_use]
    pub fn new(trace_id: &str, level: LogLevel, event: &str) -> Self {
        Self {
            timestamp: utc_timestamp(),
            trace_id: trace_id.to_string(),
            level,
            event: event.to_string(),
            outcome: None,
            family: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_family(mut self, family: &str) -> Self {
        self.family = Some(family.to_string());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

enum Sink {
    File(BufWriter<File>),
    Memory(Vec<u8>),
}

/// Writes [`LogEntry`] values as JSONL to a file or an in-memory buffer.
pub struct LogEmitter {
    sink: Sink,
    run_id: String,
    seq: u64,
}

impl LogEmitter {
    /// Creates (truncating) `path` and any missing parent directories.
    pub fn to_file(path: &Path, run_id: &str) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            sink: Sink::File(BufWriter::new(file)),
            run_id: run_id.to_string(),
            seq: 0,
        })
    }

    #[must_use]
    pub fn in_memory(run_id: &str) -> Self {
        Self {
            sink: Sink::Memory(Vec::new()),
            run_id: run_id.to_string(),
            seq: 0,
        }
    }

    pub fn emit_entry(&mut self, mut entry: LogEntry) -> io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = format!("{}::{:06}", self.run_id, self.seq);
        }
        self.seq += 1;
        let line = serde_json::to_string(&entry).map_err(io::Error::other)?;
        match &mut self.sink {
            Sink::File(w) => writeln!(w, "{line}"),
            Sink::Memory(buf) => writeln!(buf, "{line}"),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::File(w) => w.flush(),
            Sink::Memory(_) => Ok(()),
        }
    }

    /// Entries emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.seq
    }

    /// Buffered JSONL for an in-memory emitter; `None` for a file emitter.
    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        match &self.sink {
            Sink::Memory(buf) => std::str::from_utf8(buf).ok(),
            Sink::File(_) => None,
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
#[must_use]
pub fn utc_timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format_utc(secs)
}

fn format_utc(epoch_secs: u64) -> String {
    let days = (epoch_secs / 86_400) as i64;
    let rem = epoch_secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3_600,
        (rem % 3_600) / 60,
        rem % 60
    )
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
