use std::{fs::OpenOptions, io::Write, sync::Mutex};

use crate::trace::record::TraceRecord;

/// Append-only JSONL sink for execution records.
///
/// Fail-soft: an unopenable file or a failed write degrades to a warning on
/// stderr; tracing problems never abort a script execution.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Self { file: None }
            }
        }
    }

    /// A logger that drops everything. Used by sessions that have no
    /// execution log configured.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn log(&self, record: &TraceRecord) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return, // tracing disabled
        };

        let json = match serde_json::to_string(record) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Warning: failed to serialize trace record: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            eprintln!("Warning: failed to write trace record: {}", e);
        }
    }
}
