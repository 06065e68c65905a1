use crate::codec::EntityCodec;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::ShufflerConfig;
use crate::document::Project;
use crate::error::{Result, ShufflerError};
use crate::model::Section;
use crate::store::StorageProvider;
use crate::writer::ProjectWriter;
use std::path::Path;

/// Writes an empty project (root section, default category, default config).
/// Refuses a directory that already holds a manifest.
pub fn run<S: StorageProvider>(
    storage: &S,
    project_dir: &Path,
    root_summary: &str,
) -> Result<CmdResult> {
    let codec = EntityCodec::new(storage);
    if storage.exists(&codec.manifest_path(project_dir)) {
        return Err(ShufflerError::InvalidOperation(format!(
            "A project already exists at {}",
            project_dir.display()
        )));
    }

    let mut project = Project::new(Section::new(root_summary));
    ProjectWriter::new(storage).save(&mut project, project_dir)?;
    if !storage.exists(&ShufflerConfig::path(project_dir)) {
        ShufflerConfig::default().save(storage, project_dir)?;
    }

    let mut result = CmdResult::default().with_affected(vec![project.root_id()]);
    result.add_message(CmdMessage::success(format!(
        "Initialized project at {}",
        project_dir.display()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ProjectLoader;
    use crate::store::memory::MemoryStorage;

    #[test]
    fn test_init_writes_loadable_project() {
        let storage = MemoryStorage::new();
        let dir = Path::new("book");
        let result = run(&storage, dir, "My Novel").unwrap();

        let loaded = ProjectLoader::new(&storage).load(dir).unwrap();
        assert_eq!(loaded.root.id(), result.affected[0]);
        assert_eq!(loaded.root.meta.summary, "My Novel");
        assert!(loaded.warnings.is_empty());
        assert!(storage.exists(&dir.join("config.json")));
    }

    #[test]
    fn test_init_refuses_existing_project() {
        let storage = MemoryStorage::new();
        let dir = Path::new("book");
        run(&storage, dir, "First").unwrap();
        let err = run(&storage, dir, "Second").unwrap_err();
        assert!(matches!(err, ShufflerError::InvalidOperation(_)));
    }
}
