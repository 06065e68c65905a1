//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry point for
//! every shuffler operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Loads** the project before a command and **saves** it after a mutating one
//! - **Normalizes inputs** (selectors like `root` or a uuid prefix become entity ids)
//! - **Reads import sources** from the filesystem and hands their text to the command layer
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Presentation**: no stdout, stderr or formatting
//!
//! ## Generic Over StorageProvider
//!
//! `ShufflerApi<S: StorageProvider>` runs on `FsStorage` in production and `MemoryStorage`
//! in tests. A save only happens when the command actually changed something.

use crate::codec::{Decoded, EntityCodec};
use crate::commands::{self, helpers};
use crate::config::ShufflerConfig;
use crate::document::Project;
use crate::error::{Result, ShufflerError};
use crate::loader::{LoadWarning, ProjectLoader};
use crate::model::{Entity, EntityKind, Section};
use crate::store::StorageProvider;
use crate::writer::ProjectWriter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_ROOT_SUMMARY: &str = "Project Root";

pub struct ShufflerApi<S: StorageProvider> {
    storage: S,
    project_path: PathBuf,
}

impl<S: StorageProvider> ShufflerApi<S> {
    pub fn new(storage: S, project_path: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            project_path: project_path.into(),
        }
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load_config(&self) -> Result<ShufflerConfig> {
        ShufflerConfig::load(&self.storage, &self.project_path)
    }

    /// Loads the project. Load warnings are already logged by the loader.
    pub fn load(&self) -> Result<(Project, Vec<LoadWarning>)> {
        let mut result = ProjectLoader::new(&self.storage).load(&self.project_path)?;
        let warnings = std::mem::take(&mut result.warnings);
        Ok((Project::from_load_result(result), warnings))
    }

    pub fn save(&self, project: &mut Project) -> Result<()> {
        ProjectWriter::new(&self.storage).save(project, &self.project_path)
    }

    fn read<F>(&self, f: F) -> Result<commands::CmdResult>
    where
        F: FnOnce(&Project) -> Result<commands::CmdResult>,
    {
        let (project, _) = self.load()?;
        f(&project)
    }

    /// Load → command → save. A save rewrites every entity file, so it is refused while the
    /// store holds files the loader had to skip; `doctor --fix` is the explicit way to drop
    /// them. Other load warnings are passed on as messages.
    fn mutate<F>(&self, f: F) -> Result<commands::CmdResult>
    where
        F: FnOnce(&mut Project) -> Result<commands::CmdResult>,
    {
        let (mut project, warnings) = self.load()?;
        let mut result = f(&mut project)?;
        if project.has_unsaved_changes() {
            let skipped = warnings.iter().filter(|w| w.skips_file()).count();
            if skipped > 0 {
                return Err(ShufflerError::InvalidOperation(format!(
                    "{} project file(s) could not be loaded and saving would delete them. \
                     Run `shuffler doctor` to see them, fix them by hand or run \
                     `shuffler doctor --fix` to drop them",
                    skipped
                )));
            }
            self.save(&mut project)?;
        } else {
            debug!("nothing changed, skipping save");
        }
        for warning in &warnings {
            result.add_message(commands::CmdMessage::warning(warning.to_string()));
        }
        Ok(result)
    }

    pub fn init(&self, root_summary: Option<&str>) -> Result<commands::CmdResult> {
        commands::init::run(
            &self.storage,
            &self.project_path,
            root_summary.unwrap_or(DEFAULT_ROOT_SUMMARY),
        )
    }

    pub fn tree(&self) -> Result<commands::CmdResult> {
        self.read(commands::tree::run)
    }

    pub fn show(&self, selector: &str) -> Result<commands::CmdResult> {
        self.read(|project| {
            let id = helpers::resolve(project, selector)?;
            commands::show::run(project, id)
        })
    }

    pub fn add(
        &self,
        parent: &str,
        kind: EntityKind,
        summary: Option<String>,
        content: Option<String>,
    ) -> Result<commands::CmdResult> {
        let config = self.load_config()?;
        self.mutate(|project| {
            let parent = helpers::resolve(project, parent)?;
            commands::add::run(project, &config, parent, kind, summary, content)
        })
    }

    /// `category` is a category id or name; an empty string clears the category.
    pub fn update(
        &self,
        selector: &str,
        mut update: commands::update::EntityUpdate,
        category: Option<&str>,
    ) -> Result<commands::CmdResult> {
        self.mutate(|project| {
            let id = helpers::resolve(project, selector)?;
            if let Some(category) = category {
                update.category = Some(if category.trim().is_empty() {
                    None
                } else {
                    Some(helpers::resolve_category(project, category)?)
                });
            }
            commands::update::run(project, id, update)
        })
    }

    pub fn detach<I: AsRef<str>>(&self, selectors: &[I]) -> Result<commands::CmdResult> {
        self.mutate(|project| {
            let ids = helpers::resolve_all(project, selectors)?;
            commands::detach::run(project, &ids)
        })
    }

    pub fn attach(&self, selector: &str, parent: &str) -> Result<commands::CmdResult> {
        self.mutate(|project| {
            let id = helpers::resolve(project, selector)?;
            let parent = helpers::resolve(project, parent)?;
            commands::attach::run(project, id, parent)
        })
    }

    pub fn delete<I: AsRef<str>>(&self, selectors: &[I]) -> Result<commands::CmdResult> {
        self.mutate(|project| {
            let ids = helpers::resolve_all(project, selectors)?;
            commands::delete::run(project, &ids)
        })
    }

    /// Imports files and directories. Directory entries are filtered by the configured
    /// import extensions; files named explicitly are always read.
    pub fn import_paths(&self, paths: Vec<PathBuf>) -> Result<commands::CmdResult> {
        let config = self.load_config()?;
        let mut sources = Vec::new();
        let mut skipped = Vec::new();

        for path in paths {
            if path.is_dir() {
                let mut files: Vec<PathBuf> = fs::read_dir(&path)
                    .map_err(|e| ShufflerError::storage(&path, e))?
                    .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                    .filter(|sub_path| sub_path.is_file() && config.is_importable(sub_path))
                    .collect();
                files.sort();
                for file in files {
                    sources.push(read_source(&file)?);
                }
            } else if path.is_file() {
                sources.push(read_source(&path)?);
            } else {
                skipped.push(path);
            }
        }

        let mut result = self.import_sources(&sources)?;
        for path in skipped.iter().rev() {
            result.messages.insert(
                0,
                commands::CmdMessage::warning(format!("Path not found: {}", path.display())),
            );
        }
        Ok(result)
    }

    pub fn import_sources(
        &self,
        sources: &[commands::import::ImportSource],
    ) -> Result<commands::CmdResult> {
        self.mutate(|project| commands::import::run(project, sources))
    }

    /// Exports a section (the root when `selector` is `None`) as tagged text.
    pub fn export(&self, selector: Option<&str>) -> Result<commands::CmdResult> {
        self.read(|project| {
            let id = match selector {
                Some(selector) => helpers::resolve(project, selector)?,
                None => project.root_id(),
            };
            commands::export::run(project, id)
        })
    }

    /// Re-reads one entity's file and copies its values onto `project`, a live project the
    /// caller keeps in memory. Picks up hand edits to the file without touching structure.
    /// Nothing is saved.
    pub fn reload(&self, project: &mut Project, selector: &str) -> Result<commands::CmdResult> {
        let id = helpers::resolve(project, selector)?;
        let codec = EntityCodec::new(&self.storage);
        let path = if id == project.root_id() {
            codec.section_path(&self.project_path, id)
        } else {
            let entity = project.find(id).ok_or(ShufflerError::EntityNotFound(id))?;
            codec.entity_path(&self.project_path, entity)
        };
        let source = match codec.deserialize(&path)? {
            Decoded::Card(card) => Entity::Card(card),
            Decoded::Section(record) => Entity::Section(Section::from_meta(record.to_meta())),
        };

        let mut result = commands::CmdResult::default();
        if project.copy_values_from(id, &source)? {
            result.affected.push(id);
            result.add_message(commands::CmdMessage::success(format!(
                "Reloaded {}",
                commands::describe(project, id)
            )));
        } else {
            result.add_message(commands::CmdMessage::info(format!(
                "{} already matches its file",
                commands::describe(project, id)
            )));
        }
        Ok(result)
    }

    pub fn category(
        &self,
        action: commands::category::CategoryAction,
    ) -> Result<commands::CmdResult> {
        if action.is_mutation() {
            self.mutate(|project| commands::category::run(project, action))
        } else {
            let (mut project, _) = self.load()?;
            commands::category::run(&mut project, action)
        }
    }

    /// Resolves a category selector (id or name) against the current project.
    pub fn resolve_category(&self, selector: &str) -> Result<crate::categories::CategoryId> {
        let (project, _) = self.load()?;
        helpers::resolve_category(&project, selector)
    }

    /// Reports load problems; with `fix`, saves the loaded state back so the store is clean.
    pub fn doctor(&self, fix: bool) -> Result<commands::CmdResult> {
        let (mut project, warnings) = self.load()?;
        let rewrite = fix && !warnings.is_empty();
        if rewrite {
            self.save(&mut project)?;
        }
        commands::doctor::run(&warnings, rewrite)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.storage, &self.project_path, action)
    }
}

fn read_source(path: &Path) -> Result<commands::import::ImportSource> {
    let text = fs::read_to_string(path).map_err(|e| ShufflerError::storage(path, e))?;
    Ok(commands::import::ImportSource::new(
        path.display().to_string(),
        text,
    ))
}

pub use crate::commands::category::CategoryAction;
pub use crate::commands::config::ConfigAction;
pub use crate::commands::import::ImportSource;
pub use crate::commands::update::EntityUpdate;
pub use commands::{CmdMessage, CmdResult, EntityView, MessageLevel, OutlineRow};
