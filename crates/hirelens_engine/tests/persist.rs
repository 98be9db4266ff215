use std::fs;

use hirelens_engine::{ensure_state_dir, write_atomically, JobIdStore, RonJobIdStore, STATE_FILENAME};
use tempfile::TempDir;

#[test]
fn creates_missing_state_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_state_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();

    let first = write_atomically(temp.path(), "state.ron", "hello").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = write_atomically(temp.path(), "state.ron", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn write_into_a_file_path_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    assert!(write_atomically(&file_path, "state.ron", "data").is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}

#[test]
fn job_id_survives_a_restart() {
    let temp = TempDir::new().unwrap();
    let store = RonJobIdStore::new(temp.path());
    assert_eq!(store.load(), None);

    store.save("job-1").unwrap();
    store.save("job-2").unwrap();

    let reopened = RonJobIdStore::new(temp.path());
    assert_eq!(reopened.load().as_deref(), Some("job-2"));
    assert!(temp.path().join(STATE_FILENAME).is_file());
}

#[test]
fn corrupt_state_loads_as_nothing() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(STATE_FILENAME), "{ this is not ron").unwrap();

    let store = RonJobIdStore::new(temp.path());
    assert_eq!(store.load(), None);

    store.save("job-3").unwrap();
    assert_eq!(store.load().as_deref(), Some("job-3"));
}

#[test]
fn empty_state_loads_as_nothing() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(STATE_FILENAME), "(last_job_id: None)").unwrap();
    assert_eq!(RonJobIdStore::new(temp.path()).load(), None);
}
