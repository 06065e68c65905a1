//! # Storage Layer
//!
//! The core never opens files directly. Everything it persists goes through the
//! [`StorageProvider`] trait: a path-addressed store of text blobs.
//!
//! ## Implementations
//!
//! - [`fs::FsStorage`]: production storage on the local filesystem.
//!   - `put` creates missing parent directories and writes atomically (temp file + rename).
//!   - `delete` removes a single file or a whole directory tree.
//!
//! - [`memory::MemoryStorage`]: in-memory storage for testing.
//!   - Paths are plain map keys, "directories" are path prefixes.
//!   - Can simulate write failures.
//!
//! ## Storage Layout
//!
//! ```text
//! my-book/
//! ├── project.yaml            # Manifest: root id + categories
//! ├── config.json             # CLI configuration
//! ├── sections/{uuid}.yaml    # One file per section
//! └── cards/{uuid}.md         # One file per card (front matter + content)
//! ```
//!
//! Providers are synchronous and blocking. A slow provider blocks the caller for the
//! duration of a load or save.

use crate::error::Result;
use std::path::{Path, PathBuf};

pub mod fs;
pub mod memory;

pub trait StorageProvider {
    /// Read a whole text blob.
    fn get(&self, path: &Path) -> Result<String>;

    /// Write a whole text blob, creating parent "directories" as needed.
    fn put(&self, path: &Path, value: &str) -> Result<()>;

    /// Paths of the blobs directly inside `dir`. A missing directory lists as empty.
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Delete a blob, or everything below a directory-like prefix. Missing paths are not an error.
    fn delete(&self, path: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn join(&self, base: &Path, segments: &[&str]) -> PathBuf {
        let mut path = base.to_path_buf();
        for segment in segments {
            path.push(segment);
        }
        path
    }
}

impl<S: StorageProvider + ?Sized> StorageProvider for &S {
    fn get(&self, path: &Path) -> Result<String> {
        (**self).get(path)
    }

    fn put(&self, path: &Path, value: &str) -> Result<()> {
        (**self).put(path, value)
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        (**self).list(dir)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        (**self).delete(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn join(&self, base: &Path, segments: &[&str]) -> PathBuf {
        (**self).join(base, segments)
    }
}
