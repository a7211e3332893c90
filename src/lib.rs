//! hourglass - fitness coaching tracker
//!
//! Exercise videos keyed by exercise, an append-only workout log and
//! daily body-metrics check-ins.

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod exercises;
pub mod ident;
pub mod metrics;
pub mod session;
pub mod sets;
pub mod tui;
pub mod workout_log;

pub use config::{AdminMode, Config};
pub use content::{ContentKey, ContentStore, Resolution};
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use workout_log::WorkoutLog;
