//! Session context - navigation and form state for one user session
//!
//! Every interaction is an [`Action`] applied to the current [`Session`],
//! producing the next one. Nothing here touches storage.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::metrics::BodyMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    WorkoutOverview,
    WorkoutTracker,
    MealPlans,
    WeightTracker,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::WorkoutOverview,
        Page::WorkoutTracker,
        Page::MealPlans,
        Page::WeightTracker,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::WorkoutOverview => "workout_overview",
            Page::WorkoutTracker => "workout_tracker",
            Page::MealPlans => "meal_plans",
            Page::WeightTracker => "weight_tracker",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::WorkoutOverview => "Workout Overview",
            Page::WorkoutTracker => "Workout Tracker",
            Page::MealPlans => "Meal Plans",
            Page::WeightTracker => "Weight Tracker",
        }
    }

    /// Page for a key; unknown keys land on Home
    pub fn from_key(key: &str) -> Page {
        key.parse().unwrap_or_default()
    }
}

impl FromStr for Page {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL.into_iter().find(|p| p.key() == s).ok_or(())
    }
}

/// Which field of a set a draft value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Reps,
    Weight,
    Completed,
}

impl SetField {
    fn suffix(self) -> &'static str {
        match self {
            SetField::Reps => "reps",
            SetField::Weight => "weight",
            SetField::Completed => "completed",
        }
    }
}

/// Key of a set-input draft: `<exercise_id>_<date>_set<N>_<field>`
pub fn draft_key(exercise_id: &str, date: NaiveDate, set_number: u32, field: SetField) -> String {
    format!("{}_{}_set{}_{}", exercise_id, date.format("%Y-%m-%d"), set_number, field.suffix())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DraftValue {
    Flag(bool),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(Page),
    SelectLevel(u8),
    SelectWorkout { day: String, label: String },
    MarkCompleted(String),
    SetDraft { key: String, value: DraftValue },
    ResetData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub page: Page,
    pub selected_level: u8,
    pub selected_workout: Option<String>,
    pub selected_workout_day: Option<String>,
    pub completed_exercises: Vec<String>,
    pub workout_sets: BTreeMap<String, DraftValue>,
    pub weight_entries: Vec<BodyMetrics>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            page: Page::Home,
            selected_level: 1,
            selected_workout: None,
            selected_workout_day: None,
            completed_exercises: Vec::new(),
            workout_sets: BTreeMap::new(),
            weight_entries: Vec::new(),
        }
    }
}

impl Session {
    /// Next session state after `action`
    pub fn apply(mut self, action: Action) -> Session {
        match action {
            Action::Navigate(page) => self.page = page,
            Action::SelectLevel(level @ 1..=2) => {
                self.selected_level = level;
                self.selected_workout = None;
                self.selected_workout_day = None;
            }
            Action::SelectLevel(_) => {}
            Action::SelectWorkout { day, label } => {
                self.selected_workout = Some(label);
                self.selected_workout_day = Some(day);
            }
            Action::MarkCompleted(key) => {
                if !self.completed_exercises.contains(&key) {
                    self.completed_exercises.push(key);
                }
            }
            Action::SetDraft { key, value } => {
                self.workout_sets.insert(key, value);
            }
            Action::ResetData => {
                self.completed_exercises.clear();
                self.workout_sets.clear();
                self.weight_entries.clear();
            }
        }
        self
    }

    pub fn draft_number(&self, key: &str, default: f64) -> f64 {
        match self.workout_sets.get(key) {
            Some(DraftValue::Number(n)) => *n,
            _ => default,
        }
    }

    pub fn draft_flag(&self, key: &str) -> bool {
        matches!(self.workout_sets.get(key), Some(DraftValue::Flag(true)))
    }
}
