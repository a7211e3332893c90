//! Workout log - append-only CSV ledger of logged sets

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, warn};

use crate::error::{StoreError, StoreResult};

/// Most sets a single save may log
pub const MAX_SETS: u32 = 20;

/// One logged set, column order matches the file header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    pub exercise_id: String,
    pub exercise: String,
    #[serde(rename = "set")]
    pub set_number: u32,
    pub reps: u32,
    /// Load in lbs
    pub weight: f64,
    #[serde(deserialize_with = "bool_any_case")]
    pub completed: bool,
}

/// `true`/`false` in any case; older logs hold `True`/`False`
fn bool_any_case<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(de::Error::invalid_value(Unexpected::Str(raw), &"true or false"))
    }
}

/// Per-set input collected before saving an exercise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetInput {
    pub reps: u32,
    pub weight: f64,
    pub completed: bool,
}

impl SetInput {
    /// `count` identical sets, refusing more than [`MAX_SETS`]
    pub fn repeated(self, count: u32) -> StoreResult<Vec<SetInput>> {
        if count > MAX_SETS {
            return Err(StoreError::TooManySets { count, limit: MAX_SETS });
        }
        Ok(vec![self; count as usize])
    }
}

/// Result of saving several sets; rows are appended independently
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub saved: usize,
    pub failed: usize,
}

impl BatchOutcome {
    pub fn all_saved(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone)]
pub struct WorkoutLog {
    path: PathBuf,
}

impl WorkoutLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_header(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true)
    }

    /// Append one row, creating the file with a header if needed
    pub fn try_append(&self, entry: &LogEntry) -> StoreResult<()> {
        let write_header = self.needs_header();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer
            .serialize(entry)
            .map_err(|e| StoreError::csv(&self.path, e))?;
        writer.flush().map_err(|e| StoreError::io(&self.path, e))
    }

    /// Append one row; failures are logged and reported as `false`
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &self,
        date: NaiveDate,
        exercise_id: &str,
        exercise_name: &str,
        set_number: u32,
        reps: u32,
        weight: f64,
        completed: bool,
    ) -> bool {
        let entry = LogEntry {
            date,
            exercise_id: exercise_id.to_string(),
            exercise: exercise_name.to_string(),
            set_number,
            reps,
            weight,
            completed,
        };
        match self.try_append(&entry) {
            Ok(()) => true,
            Err(e) => {
                error!("Error saving workout log: {}", e);
                false
            }
        }
    }

    /// Save sets 1..=N for one exercise. A failure part-way leaves the
    /// earlier rows saved.
    pub fn append_sets(
        &self,
        date: NaiveDate,
        exercise_id: &str,
        exercise_name: &str,
        sets: &[SetInput],
    ) -> BatchOutcome {
        let entries = (1u32..).zip(sets).map(|(set_number, input)| LogEntry {
            date,
            exercise_id: exercise_id.to_string(),
            exercise: exercise_name.to_string(),
            set_number,
            reps: input.reps,
            weight: input.weight,
            completed: input.completed,
        });
        append_each(entries, |entry| self.try_append(entry))
    }

    /// All rows in file order
    pub fn try_entries(&self) -> StoreResult<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StoreError::csv(&self.path, e))?;
        let mut entries = Vec::new();
        for row in reader.deserialize::<LogEntry>() {
            match row {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unreadable workout log row: {}", e),
            }
        }
        Ok(entries)
    }

    /// Rows for `date` and `exercise_id`, in the order they were appended
    pub fn query(&self, date: NaiveDate, exercise_id: &str) -> Vec<LogEntry> {
        match self.try_entries() {
            Ok(entries) => entries
                .into_iter()
                .filter(|e| e.date == date && e.exercise_id == exercise_id)
                .collect(),
            Err(e) => {
                error!("Error reading workout log: {}", e);
                Vec::new()
            }
        }
    }
}

/// Write rows one by one, counting each outcome
fn append_each(
    entries: impl IntoIterator<Item = LogEntry>,
    mut write: impl FnMut(&LogEntry) -> StoreResult<()>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for entry in entries {
        match write(&entry) {
            Ok(()) => outcome.saved += 1,
            Err(e) => {
                error!("Error saving set {} of {}: {}", entry.set_number, entry.exercise_id, e);
                outcome.failed += 1;
            }
        }
    }
    outcome
}
