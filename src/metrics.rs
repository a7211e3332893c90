//! Body metrics - daily check-ins, summaries and best-effort mirroring
//!
//! The in-session list of entries is what charts and history read. A
//! durable mirror may receive a copy; its failures only cost persistence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// One daily check-in (imperial units, as entered)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    pub date: NaiveDate,
    /// lbs
    pub weight: f64,
    /// inches
    pub waist: f64,
    /// inches
    pub hips: f64,
    /// liters
    pub water: f64,
    pub calories_in: i64,
    pub calories_out: i64,
    pub net_calories: i64,
    /// 1-10
    pub energy: u8,
    /// hours
    pub sleep: f64,
    pub notes: String,
}

impl BodyMetrics {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        weight: f64,
        waist: f64,
        hips: f64,
        water: f64,
        calories_in: i64,
        calories_out: i64,
        energy: u8,
        sleep: f64,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            date,
            weight,
            waist,
            hips,
            water,
            calories_in,
            calories_out,
            net_calories: calories_in - calories_out,
            energy,
            sleep,
            notes: notes.into(),
        }
    }

    pub fn waist_to_hip(&self) -> Option<f64> {
        (self.hips > 0.0).then(|| self.waist / self.hips)
    }
}

/// Durable store that can receive a copy of each entry
pub trait MetricsMirror {
    fn mirror(&self, entry: &BodyMetrics) -> StoreResult<()>;
}

/// What happened to the durable copy of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    Mirrored,
    /// No mirror configured
    Skipped,
    Failed(String),
}

/// Record `entry` in the session list and offer it to `mirror`.
///
/// The session copy is always kept, whatever the mirror reports.
pub fn record(
    entries: &mut Vec<BodyMetrics>,
    entry: BodyMetrics,
    mirror: Option<&dyn MetricsMirror>,
) -> MirrorOutcome {
    let outcome = match mirror {
        None => MirrorOutcome::Skipped,
        Some(m) => match m.mirror(&entry) {
            Ok(()) => MirrorOutcome::Mirrored,
            Err(e) => {
                warn!("Body metrics mirror failed, keeping session copy only: {}", e);
                MirrorOutcome::Failed(e.to_string())
            }
        },
    };
    debug!("Recorded body metrics for {} ({:?})", entry.date, outcome);
    entries.push(entry);
    outcome
}

/// Figures shown on the progress page
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    /// Last minus first weight by date; needs two entries
    pub weight_change: Option<f64>,
    pub avg_net_calories: f64,
    pub avg_water: f64,
    pub avg_energy: f64,
    pub weight_trend: Vec<(NaiveDate, f64)>,
    pub waist_to_hip: Vec<(NaiveDate, f64)>,
}

impl MetricsSummary {
    /// Summarize all entries; same-date duplicates all count
    pub fn from_entries(entries: &[BodyMetrics]) -> Self {
        let mut sorted: Vec<&BodyMetrics> = entries.iter().collect();
        // Stable, so duplicates keep their entry order
        sorted.sort_by_key(|e| e.date);

        let weight_change = match (sorted.first(), sorted.last()) {
            (Some(first), Some(last)) if sorted.len() >= 2 => Some(last.weight - first.weight),
            _ => None,
        };

        let avg = |f: fn(&BodyMetrics) -> f64| {
            if sorted.is_empty() {
                0.0
            } else {
                sorted.iter().map(|&e| f(e)).sum::<f64>() / sorted.len() as f64
            }
        };

        Self {
            weight_change,
            avg_net_calories: avg(|e| e.net_calories as f64),
            avg_water: avg(|e| e.water),
            avg_energy: avg(|e| f64::from(e.energy)),
            weight_trend: sorted.iter().map(|e| (e.date, e.weight)).collect(),
            waist_to_hip: sorted
                .iter()
                .filter_map(|e| e.waist_to_hip().map(|r| (e.date, r)))
                .collect(),
        }
    }
}

/// History as CSV text, newest first
pub fn export_csv(entries: &[BodyMetrics]) -> StoreResult<String> {
    let mut sorted: Vec<&BodyMetrics> = entries.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in sorted {
        writer
            .serialize(entry)
            .map_err(|e| StoreError::csv("<export>", e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::io("<export>", std::io::Error::other(e.to_string())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn entry(d: u32, weight: f64) -> BodyMetrics {
        BodyMetrics::new(day(d), weight, 30.0, 40.0, 2.5, 1700, 400, 7, 7.5, "")
    }

    struct RecordingMirror {
        seen: RefCell<Vec<NaiveDate>>,
    }

    impl MetricsMirror for RecordingMirror {
        fn mirror(&self, entry: &BodyMetrics) -> StoreResult<()> {
            self.seen.borrow_mut().push(entry.date);
            Ok(())
        }
    }

    struct BrokenMirror;

    impl MetricsMirror for BrokenMirror {
        fn mirror(&self, _entry: &BodyMetrics) -> StoreResult<()> {
            Err(StoreError::AdminRequired)
        }
    }

    #[test]
    fn test_net_calories_derived() {
        assert_eq!(entry(1, 150.0).net_calories, 1300);
    }

    #[test]
    fn test_record_without_mirror() {
        let mut entries = Vec::new();
        assert_eq!(record(&mut entries, entry(1, 150.0), None), MirrorOutcome::Skipped);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_record_mirrored() {
        let mirror = RecordingMirror { seen: RefCell::new(Vec::new()) };
        let mut entries = Vec::new();
        let outcome = record(&mut entries, entry(2, 150.0), Some(&mirror as &dyn MetricsMirror));
        assert_eq!(outcome, MirrorOutcome::Mirrored);
        assert_eq!(*mirror.seen.borrow(), vec![day(2)]);
    }

    #[test]
    fn test_record_mirror_failure_keeps_session_copy() {
        let mut entries = Vec::new();
        let outcome = record(&mut entries, entry(3, 150.0), Some(&BrokenMirror as &dyn MetricsMirror));
        assert!(matches!(outcome, MirrorOutcome::Failed(_)));
        assert_eq!(entries, vec![entry(3, 150.0)]);
    }

    #[test]
    fn test_summary_empty() {
        let summary = MetricsSummary::from_entries(&[]);
        assert_eq!(summary.weight_change, None);
        assert_eq!(summary.avg_energy, 0.0);
        assert!(summary.weight_trend.is_empty());
    }

    #[test]
    fn test_summary_weight_change_by_date() {
        let entries = vec![entry(5, 148.0), entry(1, 152.0), entry(3, 150.0)];
        let summary = MetricsSummary::from_entries(&entries);
        assert_eq!(summary.weight_change, Some(-4.0));
        assert_eq!(summary.weight_trend[0], (day(1), 152.0));
        assert_eq!(summary.avg_net_calories, 1300.0);
        assert_eq!(summary.avg_water, 2.5);
    }

    #[test]
    fn test_summary_keeps_duplicate_dates() {
        let entries = vec![entry(1, 150.0), entry(1, 151.0)];
        let summary = MetricsSummary::from_entries(&entries);
        assert_eq!(summary.weight_trend.len(), 2);
        assert_eq!(summary.weight_change, Some(1.0));
    }

    #[test]
    fn test_waist_to_hip_skips_zero_hips() {
        let mut no_hips = entry(2, 150.0);
        no_hips.hips = 0.0;
        let summary = MetricsSummary::from_entries(&[entry(1, 150.0), no_hips]);
        assert_eq!(summary.waist_to_hip, vec![(day(1), 0.75)]);
    }

    #[test]
    fn test_export_csv_newest_first() {
        let csv = export_csv(&[entry(1, 150.0), entry(2, 149.0)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].starts_with("date,weight,waist,hips,water,calories_in"));
        assert!(lines[1].starts_with("2024-06-02,149.0"));
        assert!(lines[2].starts_with("2024-06-01,150.0"));
    }
}
