//! Per-attempt step trace and optional debug dumps.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Maximum characters of raw payload kept per step.
pub const RAW_PAYLOAD_LIMIT: usize = 500;

/// The four tool steps, numbered in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Dataset overview.
    Discover,
    /// Indicator listing.
    Indicators,
    /// Filter metadata.
    Filters,
    /// Data fetch.
    Fetch,
}

impl Step {
    /// Trace id (1–4).
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Discover => 1,
            Self::Indicators => 2,
            Self::Filters => 3,
            Self::Fetch => 4,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Discover => "Discover",
            Self::Indicators => "Indicators",
            Self::Filters => "Filters",
            Self::Fetch => "Fetch",
        }
    }
}

/// One entry of the trace returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Step id (1–4).
    pub id: u8,
    /// Step name.
    pub name: String,
    /// What was asked.
    pub description: String,
    /// What came back.
    pub result: String,
    /// Elapsed time, `"{secs:.2}s"`.
    pub time: String,
    /// Truncated payload.
    pub raw_json: String,
}

impl StepRecord {
    /// Builds a record for `step`.
    #[must_use]
    pub fn new(
        step: Step,
        description: impl Into<String>,
        result: impl Into<String>,
        elapsed: Duration,
        payload: &Value,
    ) -> Self {
        Self {
            id: step.id(),
            name: step.name().to_string(),
            description: description.into(),
            result: result.into(),
            time: format_elapsed(elapsed),
            raw_json: truncate_raw(payload, RAW_PAYLOAD_LIMIT),
        }
    }
}

/// Formats a duration as seconds with two decimals.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Renders a payload compactly and cuts it to `limit` characters.
///
/// Strings are used as-is; other values are serialized. Truncated output
/// ends in `...` and is exactly `limit` characters long.
#[must_use]
pub fn truncate_raw(value: &Value, limit: usize) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if raw.chars().count() <= limit {
        return raw;
    }
    let mut cut: String = raw.chars().take(limit.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Ordered, append-only trace of one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepTrace {
    records: Vec<StepRecord>,
}

impl StepTrace {
    /// Creates an empty trace.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Appends one record.
    pub fn push(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    /// Appends all records of `other`, preserving their order.
    pub fn append(&mut self, other: &mut Self) {
        self.records.append(&mut other.records);
    }

    /// Recorded entries.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Writes raw payloads to disk when a debug directory is configured.
///
/// Dumps are diagnostics only. Failures are logged and otherwise ignored.
#[derive(Debug, Clone, Default)]
pub struct DebugSink {
    dir: Option<PathBuf>,
}

impl DebugSink {
    /// A sink that writes nothing.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { dir: None }
    }

    /// A sink writing into `dir` (created on first write).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Whether dumps are written.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Writes `value` as pretty JSON to `name` inside the debug directory.
    pub fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) {
        let Some(dir) = &self.dir else {
            return;
        };
        let path = dir.join(name);
        let outcome = std::fs::create_dir_all(dir).and_then(|()| {
            let body = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
            std::fs::write(&path, body)
        });
        if let Err(e) = outcome {
            warn!(path = %path.display(), error = %e, "failed to write debug file");
        }
    }
}
