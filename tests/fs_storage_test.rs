use shuffler::error::ShufflerError;
use shuffler::store::fs::FsStorage;
use shuffler::store::StorageProvider;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_put_creates_parent_dirs_and_leaves_no_tmp_files() {
    let temp = TempDir::new().unwrap();
    let storage = FsStorage::new();
    let path = temp.path().join("book").join("cards").join("a.md");

    storage.put(&path, "first").unwrap();
    storage.put(&path, "second").unwrap();

    assert_eq!(storage.get(&path).unwrap(), "second");
    let names: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["a.md".to_string()]);
}

#[test]
fn test_list_only_returns_files() {
    let temp = TempDir::new().unwrap();
    let storage = FsStorage::new();
    storage.put(&temp.path().join("one.yaml"), "a").unwrap();
    storage
        .put(&temp.path().join("nested").join("two.yaml"), "b")
        .unwrap();

    let listed = storage.list(temp.path()).unwrap();
    assert_eq!(listed, vec![temp.path().join("one.yaml")]);
    assert!(storage.list(&temp.path().join("missing")).unwrap().is_empty());
}

#[test]
fn test_delete_file_and_directory() {
    let temp = TempDir::new().unwrap();
    let storage = FsStorage::new();
    let dir = temp.path().join("sections");
    storage.put(&dir.join("x.yaml"), "x").unwrap();

    storage.delete(&dir).unwrap();
    assert!(!storage.exists(&dir));
    // Deleting something that is not there is fine.
    storage.delete(&dir).unwrap();
}

#[test]
fn test_get_missing_is_storage_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.md");
    match FsStorage::new().get(&path) {
        Err(ShufflerError::Storage { path: err_path, .. }) => assert_eq!(err_path, path),
        other => panic!("expected storage error, got {:?}", other),
    }
}
