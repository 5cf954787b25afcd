use intersection::Action;
use learner::{AgentConfig, TabularAgent, ValueTable, TABLE_SIZE};
use runtime::{load_table, save_table, try_load_table, FsTableStore, StoreError, TableStore};
use std::fs;

#[test]
fn missing_blob_loads_as_a_fresh_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsTableStore::new(dir.path().join("models"));
    let table = load_table(&store, "q_table", TABLE_SIZE, Action::COUNT);
    let fresh = TabularAgent::new(AgentConfig::default());
    assert_eq!(&table, fresh.live_table());
    // Loading must not create anything.
    assert!(!dir.path().join("models").exists());
}

#[test]
fn save_creates_the_directory_and_load_restores_values() {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("nested").join("models");
    let mut store = FsTableStore::new(&models);

    let mut table = ValueTable::zeros(TABLE_SIZE, Action::COUNT);
    table.set(0, 0, -1.25);
    table.set(999, 1, -40.0);
    save_table(&mut store, "q_table", &table).unwrap();

    assert!(store.path_for("q_table").is_file());
    assert!(!models.join("q_table.bin.tmp").exists());
    assert_eq!(load_table(&store, "q_table", TABLE_SIZE, Action::COUNT), table);

    // A second save overwrites the same blob.
    table.set(500, 0, 7.0);
    save_table(&mut store, "q_table", &table).unwrap();
    assert_eq!(load_table(&store, "q_table", TABLE_SIZE, Action::COUNT), table);
}

#[test]
fn corrupt_file_is_reported_and_replaced_by_zeros() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsTableStore::new(dir.path());
    fs::write(store.path_for("q_table"), b"garbage").unwrap();

    assert!(matches!(
        try_load_table(&store, "q_table", TABLE_SIZE, Action::COUNT),
        Err(StoreError::Corrupt(_))
    ));
    assert!(load_table(&store, "q_table", TABLE_SIZE, Action::COUNT).is_zero());
}

#[test]
fn wrong_shape_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FsTableStore::new(dir.path());
    save_table(&mut store, "small", &ValueTable::zeros(10, 2)).unwrap();
    assert!(matches!(
        try_load_table(&store, "small", TABLE_SIZE, Action::COUNT),
        Err(StoreError::Corrupt(_))
    ));
}

#[test]
fn unreadable_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsTableStore::new(dir.path());
    // A directory where the blob should be cannot be read as a file.
    fs::create_dir(store.path_for("q_table")).unwrap();
    assert!(matches!(store.load("q_table"), Err(StoreError::Io { .. })));
    assert!(load_table(&store, "q_table", TABLE_SIZE, Action::COUNT).is_zero());
}
