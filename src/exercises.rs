//! Exercise definitions - program catalog and weekly split

use serde::Serialize;

use crate::ident;
use crate::sets::parse_set_count;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Category {
    WarmUp,
    Booty,
    Core,
    Cardio,
    Recovery,
    Main,
    Accessory,
    Rest,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::WarmUp => "Warm-up",
            Category::Booty => "Booty",
            Category::Core => "Core",
            Category::Cardio => "Cardio",
            Category::Recovery => "Recovery",
            Category::Main => "Main",
            Category::Accessory => "Accessory",
            Category::Rest => "Rest",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::WarmUp => "🔥",
            Category::Booty => "🍑",
            Category::Core => "🎯",
            Category::Cardio => "🏃",
            Category::Recovery => "🧘",
            Category::Main | Category::Accessory => "💪",
            Category::Rest => "🛋",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub name: &'static str,
    /// Free-text set prescription, e.g. "1 warm up set + 3 + 1 AMRAP"
    pub sets: &'static str,
    pub reps: &'static str,
    pub category: Category,
}

impl Exercise {
    pub fn id(&self) -> String {
        ident::exercise_id(self.name)
    }

    /// Working sets to log; 0 means a simple done/not-done item
    pub fn working_sets(&self) -> u32 {
        parse_set_count(self.sets)
    }
}

/// Placeholder row inside a circuit, not an exercise
pub const CIRCUIT_MARKER: &str = "Repeat 2x total";

pub const REST: &str = "REST";

pub const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Workout label per weekday, by level
pub const PROGRAM_SPLIT: [[&str; 7]; 2] = [
    [
        "BOOTY",
        "ABS/CORE & CARDIO",
        REST,
        "LEGS & BOOTY",
        "ABS/CORE ONLY (you can do at home)",
        "LIGHT SHOULDERS & BACK",
        REST,
    ],
    [
        "BOOTY A",
        "LIGHT SHOULDERS & BACK",
        "ABS/CORE & CARDIO",
        "BOOTY B",
        "SHOULDERS & ABS/CORE",
        "LEGS & BOOTY",
        REST,
    ],
];

const fn ex(name: &'static str, sets: &'static str, reps: &'static str, category: Category) -> Exercise {
    Exercise { name, sets, reps, category }
}

pub const BOOTY: &[Exercise] = &[
    ex("Booty/Leg Activation", "—", "5 min", Category::WarmUp),
    ex("Kickbacks", "1 warm up set + 3 (each side)", "10-12 reps; 12-15 reps (last set)", Category::Booty),
    ex("Hip Thrust", "1 warm up set + 3 + 1 AMRAP", "10-12 reps; 8 reps (last set); AMRAP ~20% avg weight", Category::Booty),
    ex("Hyperextensions", "(1 warm up set) + 3 + 1 AMRAP (no weight)", "10-12 reps; 10s hold on last rep each set", Category::Booty),
    ex("RDLs (Romanian Deadlifts)", "1 warm up set + 3", "10-12 reps; 8 reps (last set)", Category::Booty),
    ex("Stairmaster Workout", "—", "30 min: fat loss levels 8-10", Category::Cardio),
    ex("Stretching", "—", "5 min", Category::Recovery),
];

pub const ABS_CORE: &[Exercise] = &[
    ex("Plank", "1", "1 min", Category::Core),
    ex("Plank Knee Taps", "1", "30 sec", Category::Core),
    ex("Reverse Plank", "1", "1 min", Category::Core),
    ex("Butterfly Kicks", "1", "30 sec", Category::Core),
    ex("Half Leg Raises", "1", "30 sec", Category::Core),
    ex("Dead Bugs", "1", "30 sec", Category::Core),
    ex(CIRCUIT_MARKER, "—", "Complete entire circuit twice", Category::Core),
];

const REST_DAY: &[Exercise] = &[ex("Rest Day", "—", "Recovery", Category::Rest)];

const GENERIC: &[Exercise] = &[
    ex("Exercise 1", "3", "10-12", Category::Main),
    ex("Exercise 2", "3", "10-12", Category::Main),
    ex("Exercise 3", "3", "10-12", Category::Accessory),
];

/// Exercises offered in the admin video picker besides the program ones
pub const BASIC_EXERCISES: &[&str] = &[
    "Hip Thrust",
    "RDLs (Romanian Deadlifts)",
    "Kickbacks",
    "Hyperextensions",
    "Bulgarian Split Squats",
    "Leg Press",
    "Leg Curl",
    "Lat Pulldown Wide Grip",
];

/// Workout label for `level` (1 or 2) on `day`
pub fn workout_for(level: u8, day: &str) -> Option<&'static str> {
    let schedule = PROGRAM_SPLIT.get(usize::from(level).checked_sub(1)?)?;
    DAYS.iter().position(|d| *d == day).map(|i| schedule[i])
}

/// Exercise list for a workout label
pub fn exercises_for_workout(label: &str) -> &'static [Exercise] {
    if label == REST {
        REST_DAY
    } else if label.contains("BOOTY") {
        BOOTY
    } else if label.contains("ABS/CORE") {
        ABS_CORE
    } else {
        GENERIC
    }
}

/// Sorted unique names of everything that can carry a video
pub fn all_exercise_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BOOTY
        .iter()
        .chain(ABS_CORE)
        .map(|e| e.name)
        .filter(|name| *name != CIRCUIT_MARKER)
        .chain(BASIC_EXERCISES.iter().copied())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

pub fn find_exercise(id: &str) -> Option<&'static Exercise> {
    BOOTY.iter().chain(ABS_CORE).find(|e| e.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_sets_from_prescription() {
        let hip_thrust = find_exercise("hip_thrust").unwrap();
        assert_eq!(hip_thrust.working_sets(), 4);
        let kickbacks = find_exercise("kickbacks").unwrap();
        assert_eq!(kickbacks.working_sets(), 3);
        let stretching = find_exercise("stretching").unwrap();
        assert_eq!(stretching.working_sets(), 0);
    }

    #[test]
    fn test_workout_for() {
        assert_eq!(workout_for(1, "Monday"), Some("BOOTY"));
        assert_eq!(workout_for(2, "Sunday"), Some(REST));
        assert_eq!(workout_for(3, "Monday"), None);
        assert_eq!(workout_for(0, "Monday"), None);
        assert_eq!(workout_for(1, "Funday"), None);
    }

    #[test]
    fn test_exercises_for_workout() {
        assert_eq!(exercises_for_workout(REST)[0].name, "Rest Day");
        assert_eq!(exercises_for_workout("BOOTY B")[2].name, "Hip Thrust");
        assert_eq!(exercises_for_workout("SHOULDERS & ABS/CORE")[0].name, "Plank");
        assert_eq!(exercises_for_workout("LIGHT SHOULDERS & BACK").len(), 3);
    }

    #[test]
    fn test_all_exercise_names_sorted_unique() {
        let names = all_exercise_names();
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        assert!(names.contains(&"Leg Press"));
        assert!(names.contains(&"Dead Bugs"));
        assert!(!names.contains(&CIRCUIT_MARKER));
        assert_eq!(names.iter().filter(|n| **n == "Hip Thrust").count(), 1);
    }

    #[test]
    fn test_ids_are_unique_in_program() {
        let mut ids: Vec<String> = BOOTY.iter().chain(ABS_CORE).map(Exercise::id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
