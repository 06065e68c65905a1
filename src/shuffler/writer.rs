//! # Project Writer
//!
//! Full rewrite of a project directory: the entity directories are cleared, every entity
//! reachable from the root or the detached pool is written to its own file, then the
//! manifest. `config.json` and any other file in the directory are left alone.
//!
//! A save is not atomic. If a write fails midway the error is returned unchanged, the
//! project keeps its unsaved-changes flag, and the directory holds a partial file set
//! until the next successful save.

use crate::codec::{EntityCodec, Manifest};
use crate::document::Project;
use crate::error::Result;
use crate::model::{Entity, Section};
use crate::store::StorageProvider;
use std::path::Path;
use tracing::debug;

pub struct ProjectWriter<S: StorageProvider> {
    codec: EntityCodec<S>,
}

impl<S: StorageProvider> ProjectWriter<S> {
    pub fn new(storage: S) -> Self {
        Self {
            codec: EntityCodec::new(storage),
        }
    }

    pub fn save(&self, project: &mut Project, project_path: &Path) -> Result<()> {
        let storage = self.codec.storage();
        storage.delete(&self.codec.sections_dir(project_path))?;
        storage.delete(&self.codec.cards_dir(project_path))?;

        let mut written = self.write_section_tree(project.root(), project_path)?;
        for entity in project.detached() {
            written += self.write_tree(entity, project_path)?;
        }

        let manifest = Manifest {
            root_id: project.root_id(),
            categories: project.categories().all().to_vec(),
        };
        self.codec.write_manifest(project_path, &manifest)?;

        debug!(files = written, path = %project_path.display(), "project saved");
        project.mark_saved();
        Ok(())
    }

    fn write_tree(&self, entity: &Entity, base: &Path) -> Result<usize> {
        match entity {
            Entity::Section(section) => self.write_section_tree(section, base),
            Entity::Card(card) => {
                self.codec.write_card(card, base)?;
                Ok(1)
            }
        }
    }

    fn write_section_tree(&self, section: &Section, base: &Path) -> Result<usize> {
        self.codec.write_section(section, base)?;
        let mut written = 1;
        for child in &section.children {
            written += self.write_tree(child, base)?;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ProjectLoader;
    use crate::model::{Card, Position, WorkflowLabel};
    use crate::store::memory::MemoryStorage;

    fn base() -> &'static Path {
        Path::new("book")
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let storage = MemoryStorage::new();
        let mut project = Project::default();
        let root = project.root_id();
        let chapter = project.create_section(root, "Chapter").unwrap();
        let mut card = Card::new("Storm", "Rain.\n");
        card.meta.notes = Some("weather".into());
        card.meta.label = WorkflowLabel::InProgress;
        card.meta.position = Position::new(40.0, -2.5);
        let cat = project.add_category("Plot", "Red");
        card.category = Some(cat);
        let card_id = project.create(chapter, card).unwrap();
        let loose = project.create_section(root, "Loose").unwrap();
        project.create_card(loose, "inside", "x").unwrap();
        project.detach(loose).unwrap();

        ProjectWriter::new(&storage).save(&mut project, base()).unwrap();
        assert!(!project.has_unsaved_changes());

        let loaded = ProjectLoader::new(&storage).load(base()).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(&loaded.root, project.root());
        assert_eq!(loaded.unattached, project.detached().to_vec());
        assert_eq!(loaded.categories, *project.categories());
        let reloaded = Project::from_load_result(loaded);
        assert_eq!(reloaded.category_of(card_id).unwrap().name, "Plot");
    }

    #[test]
    fn test_save_removes_stale_files_but_keeps_config() {
        let storage = MemoryStorage::new();
        storage
            .put(&base().join("config.json"), "{}")
            .unwrap();
        let mut project = Project::default();
        let root = project.root_id();
        let card = project.create_card(root, "gone soon", "").unwrap();
        let writer = ProjectWriter::new(&storage);
        writer.save(&mut project, base()).unwrap();

        project.detach(card).unwrap();
        project.delete_detached(card).unwrap();
        writer.save(&mut project, base()).unwrap();

        assert!(storage.list(&base().join("cards")).unwrap().is_empty());
        assert!(storage.exists(&base().join("config.json")));
        assert_eq!(storage.list(&base().join("sections")).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_save_keeps_dirty_flag() {
        let storage = MemoryStorage::new();
        let mut project = Project::default();
        let root = project.root_id();
        project.create_card(root, "c", "").unwrap();
        storage.set_simulate_write_error(true);

        let err = ProjectWriter::new(&storage)
            .save(&mut project, base())
            .unwrap_err();
        assert!(matches!(err, crate::error::ShufflerError::Storage { .. }));
        assert!(project.has_unsaved_changes());
    }
}
