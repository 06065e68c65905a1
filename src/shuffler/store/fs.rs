use super::StorageProvider;
use crate::error::{Result, ShufflerError};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| ShufflerError::storage(path, e))?;
        }
        Ok(())
    }
}

impl StorageProvider for FsStorage {
    fn get(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| ShufflerError::storage(path, e))
    }

    fn put(&self, path: &Path, value: &str) -> Result<()> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            self.ensure_dir(dir)?;
        }

        // Atomic write
        let tmp_name = format!(".shuffler-{}.tmp", Uuid::new_v4());
        let tmp_path = match dir {
            Some(dir) => dir.join(tmp_name),
            None => PathBuf::from(tmp_name),
        };
        fs::write(&tmp_path, value).map_err(|e| ShufflerError::storage(&tmp_path, e))?;
        fs::rename(&tmp_path, path).map_err(|e| ShufflerError::storage(path, e))?;
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let entries = fs::read_dir(dir).map_err(|e| ShufflerError::storage(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ShufflerError::storage(dir, e))?;
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        if path.is_file() {
            fs::remove_file(path).map_err(|e| ShufflerError::storage(path, e))?;
        } else if path.is_dir() {
            fs::remove_dir_all(path).map_err(|e| ShufflerError::storage(path, e))?;
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
