use super::StorageProvider;
use crate::error::{Result, ShufflerError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory storage for testing.
///
/// Uses `RefCell` for interior mutability since the core is single-threaded.
/// This keeps every `StorageProvider` method on `&self`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<BTreeMap<PathBuf, String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, P, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<PathBuf>,
        V: Into<String>,
    {
        let storage = Self::new();
        storage.values.borrow_mut().extend(
            values
                .into_iter()
                .map(|(path, value)| (path.into(), value.into())),
        );
        storage
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.values.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(ShufflerError::storage(
                path,
                io::Error::other("simulated write error"),
            ));
        }
        Ok(())
    }
}

impl StorageProvider for MemoryStorage {
    fn get(&self, path: &Path) -> Result<String> {
        self.values.borrow().get(path).cloned().ok_or_else(|| {
            ShufflerError::storage(path, io::Error::from(io::ErrorKind::NotFound))
        })
    }

    fn put(&self, path: &Path, value: &str) -> Result<()> {
        self.check_writable(path)?;
        self.values
            .borrow_mut()
            .insert(path.to_path_buf(), value.to_string());
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .values
            .borrow()
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.check_writable(path)?;
        self.values
            .borrow_mut()
            .retain(|key, _| !key.starts_with(path));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.values.borrow().keys().any(|key| key.starts_with(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_roundtrip() {
        let storage = MemoryStorage::new();
        let path = Path::new("book/cards/a.md");
        storage.put(path, "hello").unwrap();
        assert_eq!(storage.get(path).unwrap(), "hello");
        assert!(storage.exists(Path::new("book/cards")));
    }

    #[test]
    fn test_get_missing_is_storage_error() {
        let storage = MemoryStorage::new();
        let err = storage.get(Path::new("nope")).unwrap_err();
        assert!(matches!(err, ShufflerError::Storage { .. }));
    }

    #[test]
    fn test_list_only_direct_children() {
        let storage = MemoryStorage::with_values([
            ("book/sections/a.yaml", "a"),
            ("book/sections/b.yaml", "b"),
            ("book/sections-old/c.yaml", "c"),
            ("book/sections/nested/d.yaml", "d"),
        ]);
        let listed = storage.list(Path::new("book/sections")).unwrap();
        assert_eq!(
            listed,
            vec![
                PathBuf::from("book/sections/a.yaml"),
                PathBuf::from("book/sections/b.yaml")
            ]
        );
    }

    #[test]
    fn test_delete_prefix_is_component_wise() {
        let storage = MemoryStorage::with_values([
            ("book/cards/a.md", "a"),
            ("book/cards-backup/a.md", "a"),
            ("book/project.yaml", "p"),
        ]);
        storage.delete(Path::new("book/cards")).unwrap();
        assert_eq!(
            storage.paths(),
            vec![
                PathBuf::from("book/cards-backup/a.md"),
                PathBuf::from("book/project.yaml")
            ]
        );
    }

    #[test]
    fn test_simulated_write_error() {
        let storage = MemoryStorage::new();
        storage.set_simulate_write_error(true);
        assert!(storage.put(Path::new("x"), "y").is_err());
        storage.set_simulate_write_error(false);
        assert!(storage.put(Path::new("x"), "y").is_ok());
    }

    #[test]
    fn test_join() {
        let storage = MemoryStorage::new();
        assert_eq!(
            storage.join(Path::new("book"), &["cards", "a.md"]),
            PathBuf::from("book/cards/a.md")
        );
    }
}
