use crate::api::ShufflerApi;
use crate::codec::MANIFEST_FILE;
use crate::store::fs::FsStorage;
use std::path::{Path, PathBuf};

pub struct ShufflerContext {
    pub api: ShufflerApi<FsStorage>,
}

/// Find the project root by walking up from cwd looking for a directory that holds a
/// `project.yaml` manifest. Returns None if the filesystem root is reached first.
pub fn find_project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join(MANIFEST_FILE).is_file() {
            return Some(current);
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent.to_path_buf();
            }
            _ => return None,
        }
    }
}

/// Builds the context for a CLI run. An explicit project directory wins; otherwise the
/// nearest enclosing project, falling back to cwd (where `init` would create one).
pub fn initialize(cwd: &Path, explicit: Option<PathBuf>) -> ShufflerContext {
    let project_dir = explicit
        .map(|dir| if dir.is_absolute() { dir } else { cwd.join(dir) })
        .or_else(|| find_project_root(cwd))
        .unwrap_or_else(|| cwd.to_path_buf());

    ShufflerContext {
        api: ShufflerApi::new(FsStorage::new(), project_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_project_root_walks_up() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("novel");
        let nested = root.join("drafts").join("old");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join(MANIFEST_FILE), "rootId: x\n").unwrap();

        assert_eq!(find_project_root(&nested), Some(root.clone()));
        assert_eq!(find_project_root(&root), Some(root));
    }

    #[test]
    fn test_find_project_root_none() {
        let temp = TempDir::new().unwrap();
        // Only fails if some ancestor of the temp dir is itself a project.
        assert_eq!(find_project_root(temp.path()), None);
    }

    #[test]
    fn test_initialize_prefers_explicit_dir() {
        let temp = TempDir::new().unwrap();
        let ctx = initialize(temp.path(), Some(PathBuf::from("book")));
        assert_eq!(ctx.api.project_path(), temp.path().join("book"));

        let ctx = initialize(temp.path(), None);
        assert_eq!(ctx.api.project_path(), temp.path());
    }
}
