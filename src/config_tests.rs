#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_in_dir_creates_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("nested").join("data");
    let config = Config::in_dir(&dir, None).unwrap();

    assert!(dir.is_dir());
    assert_eq!(config.db_path, dir.join("fintrack.db"));
    assert_eq!(config.log_path, dir.join("fintrack.log"));
    assert_eq!(config.log_filter, "fintrack=info");
}

#[test]
fn test_log_filter_override() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::in_dir(tmp.path(), Some("fintrack=debug".into())).unwrap();
    assert_eq!(config.log_filter, "fintrack=debug");

    let blank = Config::in_dir(tmp.path(), Some("  ".into())).unwrap();
    assert_eq!(blank.log_filter, "fintrack=info");
}

#[test]
fn test_init_tracing_creates_log_file() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::in_dir(tmp.path(), None).unwrap();
    init_tracing(&config).unwrap();
    assert!(config.log_path.exists());
}
