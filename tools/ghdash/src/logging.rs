use crate::errors::GhdashError;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_DISK_BUDGET_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_PATH: &str = ".cache/ghdash/run.jsonl";

#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: 4096,
            budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), GhdashError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| GhdashError::Io(e.to_string()))?;
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncated,
        })
        .map_err(|e| GhdashError::Io(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| GhdashError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| GhdashError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| GhdashError::Io(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            let _ = enforce_total_budget(parent, self.budget_bytes)?;
        }

        Ok(())
    }
}

static RUN_LOGGER: OnceLock<JsonlLogger> = OnceLock::new();

/// Best-effort structured run log. Never fails the caller; checks and the
/// event loop log through this without touching their own error paths.
pub fn append_run_log(level: &str, event_type: &str, payload: Value) {
    let logger = RUN_LOGGER.get_or_init(|| {
        let path = std::env::var("GHDASH_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH));
        JsonlLogger::new(path)
    });
    let _ = logger.append(&LogEvent {
        level,
        event_type,
        payload,
    });
}

pub fn structured_fallback_line(section: &str, state: &str, message: &str) -> String {
    format!(
        "section={section} state={state} message={} ",
        message.replace('\n', "\\n")
    )
}

pub fn enforce_total_budget(dir: &Path, budget_bytes: u64) -> Result<Vec<PathBuf>, GhdashError> {
    let mut files = fs::read_dir(dir)
        .map_err(|e| GhdashError::Io(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();

    files.sort_by(|a, b| {
        let ma = fs::metadata(a).ok().and_then(|m| m.modified().ok());
        let mb = fs::metadata(b).ok().and_then(|m| m.modified().ok());
        ma.cmp(&mb)
    });

    let mut total = files
        .iter()
        .filter_map(|path| fs::metadata(path).ok().map(|meta| meta.len()))
        .sum::<u64>();

    let mut deleted = Vec::new();
    for path in files {
        if total <= budget_bytes {
            break;
        }
        let len = fs::metadata(&path)
            .map_err(|e| GhdashError::Io(e.to_string()))?
            .len();
        fs::remove_file(&path).map_err(|e| GhdashError::Io(e.to_string()))?;
        total = total.saturating_sub(len);
        deleted.push(path);
    }

    Ok(deleted)
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    // The cut index must land on a char boundary; gh stderr can carry
    // multibyte text.
    let mut cut = max_bytes.saturating_sub(3).min(rendered.len());
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut truncated = rendered;
    truncated.truncate(cut);
    Value::String(format!("{truncated}..."))
}
