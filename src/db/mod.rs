//! Database module - SQLite mirror for profiles, settings and daily logs

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::metrics::{BodyMetrics, MetricsMirror};

/// User id used by the single-user app
pub const DEFAULT_USER: &str = "default";

const LBS_TO_KG: f64 = 0.453592;

/// User profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub age: i64,
    pub sex: String,
    pub height_cm: f64,
    pub start_weight_kg: f64,
    pub activity_level: String,
    pub weekly_pace_lb: f64,
    pub goal_weight_kg: f64,
    /// ISO date
    pub goal_date: String,
}

/// Daily log row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: Option<i64>,
    pub user_id: String,
    /// ISO date
    pub date: String,
    pub weight_kg: f64,
    pub water_l: f64,
    pub cal_in: i64,
    pub cal_out: i64,
    pub net_kcal: i64,
    pub waist_in: Option<f64>,
    pub hips_in: Option<f64>,
    pub energy_1_10: Option<i64>,
    pub notes: Option<String>,
    pub photo_path: Option<String>,
    pub on_target_flag: Option<String>,
}

impl DailyLog {
    /// Row mirrored from a session check-in
    pub fn from_metrics(user_id: &str, entry: &BodyMetrics) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            weight_kg: entry.weight * LBS_TO_KG,
            water_l: entry.water,
            cal_in: entry.calories_in,
            cal_out: entry.calories_out,
            net_kcal: entry.calories_in - entry.calories_out,
            waist_in: Some(entry.waist),
            hips_in: Some(entry.hips),
            energy_1_10: Some(i64::from(entry.energy)),
            notes: Some(entry.notes.clone()),
            photo_path: None,
            on_target_flag: Some("OK".to_string()),
        }
    }

    /// Session check-in rebuilt from a mirrored row; sleep is not mirrored
    pub fn to_metrics(&self) -> Option<BodyMetrics> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()?;
        let mut entry = BodyMetrics::new(
            date,
            self.weight_kg / LBS_TO_KG,
            self.waist_in.unwrap_or_default(),
            self.hips_in.unwrap_or_default(),
            self.water_l,
            self.cal_in,
            self.cal_out,
            self.energy_1_10.and_then(|e| u8::try_from(e).ok()).unwrap_or_default(),
            0.0,
            self.notes.clone().unwrap_or_default(),
        );
        entry.net_calories = self.net_kcal;
        Some(entry)
    }
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Self { conn: Connection::open_in_memory()? };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                age INTEGER NOT NULL,
                sex TEXT NOT NULL,
                height_cm REAL NOT NULL,
                start_weight_kg REAL NOT NULL,
                activity_level TEXT NOT NULL,
                weekly_pace_lb REAL NOT NULL,
                goal_weight_kg REAL NOT NULL,
                goal_date TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS daily_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                weight_kg REAL NOT NULL,
                water_l REAL NOT NULL,
                cal_in INTEGER NOT NULL,
                cal_out INTEGER NOT NULL,
                net_kcal INTEGER NOT NULL,
                waist_in REAL,
                hips_in REAL,
                energy_1_10 INTEGER,
                notes TEXT,
                photo_path TEXT,
                on_target_flag TEXT
            );
            CREATE INDEX IF NOT EXISTS ix_daily_logs_user ON daily_logs (user_id);
            CREATE INDEX IF NOT EXISTS ix_daily_logs_date ON daily_logs (date);
            CREATE TABLE IF NOT EXISTS settings (
                user_id TEXT PRIMARY KEY,
                macro_split_json TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Insert or replace a profile
    pub fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO profiles (user_id, age, sex, height_cm, start_weight_kg, activity_level, weekly_pace_lb, goal_weight_kg, goal_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id) DO UPDATE SET
                age = excluded.age, sex = excluded.sex, height_cm = excluded.height_cm,
                start_weight_kg = excluded.start_weight_kg, activity_level = excluded.activity_level,
                weekly_pace_lb = excluded.weekly_pace_lb, goal_weight_kg = excluded.goal_weight_kg,
                goal_date = excluded.goal_date",
            params![
                profile.user_id,
                profile.age,
                profile.sex,
                profile.height_cm,
                profile.start_weight_kg,
                profile.activity_level,
                profile.weekly_pace_lb,
                profile.goal_weight_kg,
                profile.goal_date,
            ],
        )?;
        Ok(())
    }

    pub fn get_profile(&self, user_id: &str) -> StoreResult<Option<Profile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT user_id, age, sex, height_cm, start_weight_kg, activity_level, weekly_pace_lb, goal_weight_kg, goal_date
                 FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(Profile {
                        user_id: row.get(0)?,
                        age: row.get(1)?,
                        sex: row.get(2)?,
                        height_cm: row.get(3)?,
                        start_weight_kg: row.get(4)?,
                        activity_level: row.get(5)?,
                        weekly_pace_lb: row.get(6)?,
                        goal_weight_kg: row.get(7)?,
                        goal_date: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    /// Store the macro split settings as JSON
    pub fn save_settings(&self, user_id: &str, settings: &Value) -> StoreResult<()> {
        let payload = settings.to_string();
        self.conn.execute(
            "INSERT INTO settings (user_id, macro_split_json) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET macro_split_json = excluded.macro_split_json",
            params![user_id, payload],
        )?;
        Ok(())
    }

    pub fn get_settings(&self, user_id: &str) -> StoreResult<Option<Value>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT macro_split_json FROM settings WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|text| {
                serde_json::from_str(&text).map_err(|source| StoreError::Json {
                    path: PathBuf::from("settings.macro_split_json"),
                    source,
                })
            })
            .transpose()
    }

    /// Insert the day's log, or overwrite the existing one for the same user and date
    pub fn save_daily_log(&self, log: &DailyLog) -> StoreResult<i64> {
        let net_kcal = log.cal_in - log.cal_out;
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM daily_logs WHERE user_id = ?1 AND date = ?2",
                params![log.user_id, log.date],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE daily_logs SET weight_kg = ?1, water_l = ?2, cal_in = ?3, cal_out = ?4, net_kcal = ?5,
                        waist_in = ?6, hips_in = ?7, energy_1_10 = ?8, notes = ?9, photo_path = ?10, on_target_flag = ?11
                     WHERE id = ?12",
                    params![
                        log.weight_kg,
                        log.water_l,
                        log.cal_in,
                        log.cal_out,
                        net_kcal,
                        log.waist_in,
                        log.hips_in,
                        log.energy_1_10,
                        log.notes,
                        log.photo_path,
                        log.on_target_flag,
                        id,
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO daily_logs (user_id, date, weight_kg, water_l, cal_in, cal_out, net_kcal,
                        waist_in, hips_in, energy_1_10, notes, photo_path, on_target_flag)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    params![
                        log.user_id,
                        log.date,
                        log.weight_kg,
                        log.water_l,
                        log.cal_in,
                        log.cal_out,
                        net_kcal,
                        log.waist_in,
                        log.hips_in,
                        log.energy_1_10,
                        log.notes,
                        log.photo_path,
                        log.on_target_flag,
                    ],
                )?;
                Ok(self.conn.last_insert_rowid())
            }
        }
    }

    /// Logs with `start <= date <= end`, oldest first
    pub fn get_logs(&self, user_id: &str, start: &str, end: &str) -> StoreResult<Vec<DailyLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, weight_kg, water_l, cal_in, cal_out, net_kcal,
                    waist_in, hips_in, energy_1_10, notes, photo_path, on_target_flag
             FROM daily_logs
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date, id",
        )?;

        let logs = stmt
            .query_map(params![user_id, start, end], |row| {
                Ok(DailyLog {
                    id: Some(row.get(0)?),
                    user_id: row.get(1)?,
                    date: row.get(2)?,
                    weight_kg: row.get(3)?,
                    water_l: row.get(4)?,
                    cal_in: row.get(5)?,
                    cal_out: row.get(6)?,
                    net_kcal: row.get(7)?,
                    waist_in: row.get(8)?,
                    hips_in: row.get(9)?,
                    energy_1_10: row.get(10)?,
                    notes: row.get(11)?,
                    photo_path: row.get(12)?,
                    on_target_flag: row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Remove every profile, settings and log row of the user
    pub fn delete_all_user_data(&mut self, user_id: &str) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM daily_logs WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM profiles WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM settings WHERE user_id = ?1", params![user_id])?;
        tx.commit()?;
        Ok(())
    }

    /// Write all of the user's logs to `<dir>/<user_id>_logs.csv`
    pub fn export_logs_csv(&self, user_id: &str, dir: &Path) -> StoreResult<PathBuf> {
        let logs = self.get_logs(user_id, "1900-01-01", "2999-12-31")?;
        let path = dir.join(format!("{user_id}_logs.csv"));

        let mut writer = csv::Writer::from_path(&path).map_err(|e| StoreError::csv(&path, e))?;
        for log in &logs {
            writer.serialize(log).map_err(|e| StoreError::csv(&path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&path, e))?;
        Ok(path)
    }
}

impl MetricsMirror for Database {
    fn mirror(&self, entry: &BodyMetrics) -> StoreResult<()> {
        self.save_daily_log(&DailyLog::from_metrics(DEFAULT_USER, entry))
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn profile() -> Profile {
        Profile {
            user_id: DEFAULT_USER.to_string(),
            age: 31,
            sex: "F".to_string(),
            height_cm: 165.0,
            start_weight_kg: 70.0,
            activity_level: "moderate".to_string(),
            weekly_pace_lb: 1.0,
            goal_weight_kg: 62.0,
            goal_date: "2025-01-01".to_string(),
        }
    }

    fn metrics(date: &str, weight: f64) -> BodyMetrics {
        BodyMetrics::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            weight,
            30.0,
            38.0,
            2.0,
            1800,
            300,
            8,
            7.0,
            "ok",
        )
    }

    #[test]
    fn test_profile_upsert() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_profile(DEFAULT_USER).unwrap(), None);

        db.save_profile(&profile()).unwrap();
        let mut updated = profile();
        updated.age = 32;
        db.save_profile(&updated).unwrap();

        assert_eq!(db.get_profile(DEFAULT_USER).unwrap(), Some(updated));
    }

    #[test]
    fn test_settings_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let split = json!({"protein": 0.3, "carbs": 0.4, "fat": 0.3});
        db.save_settings(DEFAULT_USER, &split).unwrap();
        assert_eq!(db.get_settings(DEFAULT_USER).unwrap(), Some(split));
        assert_eq!(db.get_settings("nobody").unwrap(), None);
    }

    #[test]
    fn test_mirror_converts_to_kg_and_upserts_by_date() {
        let db = Database::open_in_memory().unwrap();
        db.mirror(&metrics("2024-06-01", 150.0)).unwrap();
        db.mirror(&metrics("2024-06-01", 149.0)).unwrap();
        db.mirror(&metrics("2024-06-02", 148.0)).unwrap();

        let logs = db.get_logs(DEFAULT_USER, "2024-06-01", "2024-06-30").unwrap();
        assert_eq!(logs.len(), 2);
        assert!((logs[0].weight_kg - 149.0 * LBS_TO_KG).abs() < 1e-9);
        assert_eq!(logs[0].net_kcal, 1500);
        assert_eq!(logs[1].date, "2024-06-02");
    }

    #[test]
    fn test_to_metrics_restores_lbs() {
        let db = Database::open_in_memory().unwrap();
        db.mirror(&metrics("2024-06-03", 150.0)).unwrap();
        let logs = db.get_logs(DEFAULT_USER, "2024-06-03", "2024-06-03").unwrap();
        let entry = logs[0].to_metrics().unwrap();
        assert!((entry.weight - 150.0).abs() < 1e-9);
        assert_eq!(entry.energy, 8);
        assert_eq!(entry.net_calories, 1500);
        assert_eq!(entry.notes, "ok");
    }

    #[test]
    fn test_get_logs_range_filters() {
        let db = Database::open_in_memory().unwrap();
        db.mirror(&metrics("2024-05-31", 150.0)).unwrap();
        db.mirror(&metrics("2024-06-15", 150.0)).unwrap();
        let logs = db.get_logs(DEFAULT_USER, "2024-06-01", "2024-06-30").unwrap();
        assert_eq!(logs.len(), 1);
        assert!(db.get_logs("other", "1900-01-01", "2999-12-31").unwrap().is_empty());
    }

    #[test]
    fn test_delete_all_user_data() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_profile(&profile()).unwrap();
        db.save_settings(DEFAULT_USER, &json!({})).unwrap();
        db.mirror(&metrics("2024-06-01", 150.0)).unwrap();

        db.delete_all_user_data(DEFAULT_USER).unwrap();

        assert_eq!(db.get_profile(DEFAULT_USER).unwrap(), None);
        assert_eq!(db.get_settings(DEFAULT_USER).unwrap(), None);
        assert!(db.get_logs(DEFAULT_USER, "1900-01-01", "2999-12-31").unwrap().is_empty());
    }

    #[test]
    fn test_export_logs_csv() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("data.db")).unwrap();
        db.mirror(&metrics("2024-06-01", 150.0)).unwrap();

        let path = db.export_logs_csv(DEFAULT_USER, dir.path()).unwrap();
        assert!(path.ends_with("default_logs.csv"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("id,user_id,date,weight_kg"));
        assert_eq!(text.lines().count(), 2);
    }
}
