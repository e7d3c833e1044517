use crate::sync::{Authority, SyncStatus};
use crate::tasks;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Stable storage key for a zero-based day index: `day1`, `day2`, ...
pub fn day_key(index: usize) -> String {
    format!("day{}", index + 1)
}

/// Inverse of [`day_key`]. Returns `None` for keys that do not name a day.
pub fn day_index(key: &str) -> Option<usize> {
    let number: usize = key.strip_prefix("day")?.parse().ok()?;
    if number == 0 || key != format!("day{number}") {
        return None;
    }
    Some(number - 1)
}

/// Canonical per-day state. An empty record and a missing record read the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayRecord {
    tasks: Vec<String>,
    note: String,
}

static EMPTY_DAY: DayRecord = DayRecord {
    tasks: Vec::new(),
    note: String::new(),
};

impl DayRecord {
    pub fn new<I, S>(tasks: I, note: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut record = Self {
            tasks: Vec::new(),
            note: note.into(),
        };
        for id in tasks {
            let id = id.into();
            if !record.tasks.contains(&id) {
                record.tasks.push(id);
            }
        }
        record
    }

    /// Every stored id, including ids this build does not know about.
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn has_note(&self) -> bool {
        !self.note.is_empty()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.iter().any(|id| id == task_id)
    }

    /// Ids that belong to the current checklist.
    pub fn known_tasks(&self) -> impl Iterator<Item = &str> {
        self.tasks
            .iter()
            .map(String::as_str)
            .filter(|id| tasks::is_known_task(id))
    }

    pub fn completed_count(&self) -> usize {
        self.known_tasks().count()
    }

    /// Flips membership of `task_id`; returns whether it is now completed.
    pub fn toggle(&mut self, task_id: &str) -> bool {
        match self.tasks.iter().position(|id| id == task_id) {
            Some(pos) => {
                self.tasks.remove(pos);
                false
            }
            None => {
                self.tasks.push(task_id.to_string());
                true
            }
        }
    }

    /// Drops every completed task. The note is kept.
    pub fn clear_tasks(&mut self) {
        self.tasks.clear();
    }

    pub fn set_note(&mut self, text: &str) {
        self.note = text.trim().to_string();
    }
}

/// A stored day value in any schema this application has ever written.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDayRecord {
    /// Bare list of completed ids, written before notes existed.
    Legacy(Vec<Value>),
    Canonical {
        #[serde(default)]
        tasks: Option<Value>,
        #[serde(default)]
        note: Option<Value>,
    },
    Unrecognized(Value),
}

/// Migrates any stored shape to the canonical record. Never fails.
pub fn normalize(raw: RawDayRecord) -> DayRecord {
    match raw {
        RawDayRecord::Legacy(ids) => DayRecord::new(string_ids(ids), ""),
        RawDayRecord::Canonical { tasks, note } => {
            let ids = match tasks {
                Some(Value::Array(ids)) => string_ids(ids),
                _ => Vec::new(),
            };
            let note = match note {
                Some(Value::String(note)) => note,
                _ => String::new(),
            };
            DayRecord::new(ids, note)
        }
        RawDayRecord::Unrecognized(_) => DayRecord::default(),
    }
}

pub fn normalize_value(value: Value) -> DayRecord {
    serde_json::from_value::<RawDayRecord>(value)
        .map(normalize)
        .unwrap_or_default()
}

fn string_ids(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(id) => Some(id),
            other => {
                debug!(value = %other, "dropping non-string task id");
                None
            }
        })
        .collect()
}

/// Day key to record. Deserializing always yields canonical records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    days: BTreeMap<String, DayRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: BTreeMap<String, RawDayRecord>) -> Self {
        Self {
            days: raw
                .into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        }
    }

    /// Reads a day, treating a missing entry as the empty record.
    pub fn record(&self, index: usize) -> &DayRecord {
        self.days.get(&day_key(index)).unwrap_or(&EMPTY_DAY)
    }

    /// Guarantees an entry exists for `index` and returns it for mutation.
    pub fn ensure(&mut self, index: usize) -> &mut DayRecord {
        self.days.entry(day_key(index)).or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, record: DayRecord) -> Option<DayRecord> {
        self.days.insert(key.into(), record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DayRecord)> {
        self.days.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<BTreeMap<String, RawDayRecord>>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw.unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    Full,
    Partial,
    Empty,
}

/// Bar colour bucket for the per-day intensity chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Full,
    High,
    Low,
    None,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub task: String,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayResponse {
    pub day: usize,
    pub key: String,
    pub date: String,
    pub tasks: Vec<String>,
    pub note: String,
    pub completed: usize,
    pub fraction: f64,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub day: usize,
    pub date: String,
    pub completed: usize,
    pub fraction: f64,
    pub class: DayClass,
    pub intensity: Intensity,
    pub has_note: bool,
    pub is_today: bool,
}

#[derive(Debug, Serialize)]
pub struct TaskTotal {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub days: usize,
    pub volume: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct HeatmapRow {
    pub task: &'static str,
    pub done: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: SyncStatus,
    pub authority: Authority,
    pub pending_writes: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_days: usize,
    pub full_days: usize,
    pub completion_percent: u32,
    pub current_streak: usize,
    pub best_streak: usize,
    pub daily: Vec<DailyPoint>,
    pub task_totals: Vec<TaskTotal>,
    pub heatmap: Vec<HeatmapRow>,
}
