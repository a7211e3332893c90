//! End-to-end flows over a scratch data directory

use chrono::NaiveDate;
use tempfile::TempDir;

use hourglass::content::ContentMap;
use hourglass::metrics::{self, BodyMetrics, MetricsMirror, MirrorOutcome};
use hourglass::workout_log::SetInput;
use hourglass::{AdminMode, Config, ContentKey, Database, Resolution, ident};

fn config(dir: &TempDir, admin: AdminMode) -> Config {
    let config = Config::new(dir.path(), admin);
    config.ensure_dirs().unwrap();
    config
}

#[test]
fn test_assign_and_resolve_exercise_video() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, AdminMode::ENABLED);
    let store = config.content_store();

    assert_eq!(ident::exercise_id("Hip Thrust"), "hip_thrust");

    config.admin.require().unwrap();
    let key = ContentKey::for_exercise("Hip Thrust").unwrap();
    store.set(&key, "https://example.com/v.mp4").unwrap();

    let mut expected = ContentMap::new();
    expected.insert("hip_thrust".to_string(), "https://example.com/v.mp4".to_string());
    assert_eq!(store.load(), expected);

    assert_eq!(
        store.resolve(&key),
        Resolution::Remote("https://example.com/v.mp4".to_string())
    );
}

#[test]
fn test_uploaded_video_resolves_locally() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, AdminMode::ENABLED);
    let key = ContentKey::for_exercise("Glute Bridge").unwrap();

    let path = config.media_library().store_upload(&key, "bridge.mp4", b"fake video").unwrap();
    config.content_store().set(&key, &path.to_string_lossy()).unwrap();

    match config.content_store().resolve(&key) {
        Resolution::Local { bytes, .. } => assert_eq!(bytes, b"fake video"),
        other => panic!("expected local video, got {:?}", other),
    }

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(config.content_store().resolve(&key), Resolution::Missing(_)));
}

#[test]
fn test_viewer_cannot_manage_content() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, AdminMode::from_flag("yes"));
    assert!(config.admin.require().is_err());
    assert_eq!(config.content_store().resolve(&ContentKey::Intro), Resolution::Unassigned);
}

#[test]
fn test_log_sets_then_query() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, AdminMode::DISABLED);
    let log = config.workout_log();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let sets = vec![SetInput { reps: 10, weight: 95.0, completed: true }; 4];
    let outcome = log.append_sets(date, "hip_thrust", "Hip Thrust", &sets);
    assert_eq!(outcome.saved, 4);
    assert!(outcome.all_saved());

    let rows = log.query(date, "hip_thrust");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows.iter().map(|r| r.set_number).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert!(log.query(date.succ_opt().unwrap(), "hip_thrust").is_empty());
}

#[test]
fn test_check_in_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, AdminMode::DISABLED);
    let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    let entry = BodyMetrics::new(date, 150.0, 29.0, 40.0, 2.5, 1700, 400, 8, 7.5, "felt good");

    {
        let db = Database::open(config.database()).unwrap();
        let mut session = Vec::new();
        let outcome = metrics::record(&mut session, entry.clone(), Some(&db as &dyn MetricsMirror));
        assert_eq!(outcome, MirrorOutcome::Mirrored);
        assert_eq!(session.len(), 1);
    }

    let db = Database::open(config.database()).unwrap();
    let logs = db.get_logs("default", "2024-06-01", "2024-06-30").unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].net_kcal, 1300);
}
