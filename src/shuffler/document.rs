//! # Project Document
//!
//! [`Project`] owns the live tree: the root section, the detached pool and the category
//! registry. Every structural change goes through its methods so the invariants hold
//! after any sequence of calls:
//!
//! - exactly one root, never detached and never a child;
//! - every other entity sits in exactly one place: under one section reachable from the
//!   root, or in the detached pool (top level or nested under a detached section);
//! - ids are unique across the whole project.
//!
//! Detaching never destroys. The only way to drop an entity is [`Project::delete_detached`],
//! which refuses anything still reachable from the root.
//!
//! ## Change notification
//!
//! Successful mutations set the unsaved-changes flag and are announced to observers
//! registered with [`Project::subscribe`] as [`ProjectEvent`]s. Setting a field to the
//! value it already has is not a change.

use crate::categories::{Category, CategoryId, CategoryRegistry};
use crate::error::{Result, ShufflerError};
use crate::loader::{LoadResult, LoadWarning};
use crate::model::{self, Card, Entity, EntityId, EntityMeta, Position, Section, WorkflowLabel};
use crate::parser::{ParseResult, PARSED_ROOT_SUMMARY};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// The field touched by a [`ProjectEvent::Changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Summary,
    Notes,
    Label,
    Position,
    Content,
    Category,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvent {
    Created { id: EntityId, parent: EntityId },
    Detached { id: EntityId },
    Attached { id: EntityId, parent: EntityId },
    Merged { attached: usize, detached: usize },
    Deleted { id: EntityId },
    Changed { id: EntityId, field: Field },
    Raised { id: EntityId },
    CategoriesChanged,
    Saved,
}

pub trait ProjectObserver {
    fn on_event(&mut self, event: &ProjectEvent);
}

impl<F: FnMut(&ProjectEvent)> ProjectObserver for F {
    fn on_event(&mut self, event: &ProjectEvent) {
        self(event)
    }
}

/// Where an entity currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Root,
    Attached { parent: EntityId },
    /// In the detached pool; `parent` is `None` at the pool's top level.
    Detached { parent: Option<EntityId> },
}

/// Outcome of merging parsed content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Top-level entities appended to the root.
    pub attached: Vec<EntityId>,
    /// Top-level entities added to the detached pool.
    pub detached: Vec<EntityId>,
    /// Every entity brought in, nested ones included.
    pub total: usize,
    pub warnings: Vec<LoadWarning>,
}

pub struct Project {
    root: Section,
    detached: Vec<Entity>,
    categories: CategoryRegistry,
    dirty: bool,
    observers: Vec<Box<dyn ProjectObserver>>,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("detached", &self.detached)
            .field("categories", &self.categories)
            .field("dirty", &self.dirty)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(Section::new(PARSED_ROOT_SUMMARY))
    }
}

impl Project {
    pub fn new(root: Section) -> Self {
        Self {
            root,
            detached: Vec::new(),
            categories: CategoryRegistry::default(),
            dirty: false,
            observers: Vec::new(),
        }
    }

    /// Adopts a loaded project. The result starts with no unsaved changes.
    pub fn from_load_result(result: LoadResult) -> Self {
        Self {
            root: result.root,
            detached: result.unattached,
            categories: result.categories,
            dirty: false,
            observers: Vec::new(),
        }
    }

    pub fn root(&self) -> &Section {
        &self.root
    }

    pub fn root_id(&self) -> EntityId {
        self.root.id()
    }

    /// Top-level entries of the detached pool.
    pub fn detached(&self) -> &[Entity] {
        &self.detached
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.notify(&ProjectEvent::Saved);
    }

    pub fn subscribe(&mut self, observer: impl ProjectObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, event: &ProjectEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(event);
        }
    }

    fn changed(&mut self, event: ProjectEvent) {
        self.dirty = true;
        self.notify(&event);
    }

    // --- Lookup ---

    /// Any non-root entity, attached or detached.
    pub fn find(&self, id: EntityId) -> Option<&Entity> {
        self.root
            .find(id)
            .or_else(|| self.detached.iter().find_map(|entity| entity.find(id)))
    }

    fn find_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if self.root.contains(id) {
            return self.root.find_mut(id);
        }
        self.detached
            .iter_mut()
            .find_map(|entity| entity.find_mut(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        id == self.root.id() || self.find(id).is_some()
    }

    /// Shared fields of any entity, the root included.
    pub fn meta(&self, id: EntityId) -> Option<&EntityMeta> {
        if id == self.root.id() {
            return Some(&self.root.meta);
        }
        self.find(id).map(Entity::meta)
    }

    fn meta_mut(&mut self, id: EntityId) -> Result<&mut EntityMeta> {
        if id == self.root.id() {
            return Ok(&mut self.root.meta);
        }
        self.find_mut(id)
            .map(Entity::meta_mut)
            .ok_or(ShufflerError::EntityNotFound(id))
    }

    /// Any section, the root included.
    pub fn section(&self, id: EntityId) -> Result<&Section> {
        if id == self.root.id() {
            return Ok(&self.root);
        }
        match self.find(id) {
            Some(Entity::Section(section)) => Ok(section),
            Some(Entity::Card(_)) => Err(ShufflerError::NotASection(id)),
            None => Err(ShufflerError::EntityNotFound(id)),
        }
    }

    fn section_mut(&mut self, id: EntityId) -> Result<&mut Section> {
        if id == self.root.id() {
            return Ok(&mut self.root);
        }
        match self.find_mut(id) {
            Some(Entity::Section(section)) => Ok(section),
            Some(Entity::Card(_)) => Err(ShufflerError::NotASection(id)),
            None => Err(ShufflerError::EntityNotFound(id)),
        }
    }

    pub fn card(&self, id: EntityId) -> Result<&Card> {
        match self.find(id) {
            Some(Entity::Card(card)) => Ok(card),
            Some(Entity::Section(_)) => Err(ShufflerError::InvalidOperation(format!(
                "{} is a section, not a card",
                id
            ))),
            None if id == self.root.id() => Err(ShufflerError::InvalidOperation(
                "the root is a section, not a card".to_string(),
            )),
            None => Err(ShufflerError::EntityNotFound(id)),
        }
    }

    fn card_mut(&mut self, id: EntityId) -> Result<&mut Card> {
        match self.find_mut(id) {
            Some(Entity::Card(card)) => Ok(card),
            Some(Entity::Section(_)) => Err(ShufflerError::InvalidOperation(format!(
                "{} is a section, not a card",
                id
            ))),
            None => Err(ShufflerError::EntityNotFound(id)),
        }
    }

    /// The section that lists `id` as a direct child, searching the root tree then the pool.
    /// `None` for the root, top-level detached entities and unknown ids.
    pub fn get_parent(&self, id: EntityId) -> Option<&Section> {
        self.root.parent_of(id).or_else(|| {
            self.detached
                .iter()
                .filter_map(Entity::as_section)
                .find_map(|section| section.parent_of(id))
        })
    }

    fn parent_of_mut(&mut self, id: EntityId) -> Option<&mut Section> {
        if self.root.contains(id) {
            return self.root.parent_of_mut(id);
        }
        self.detached
            .iter_mut()
            .filter_map(Entity::as_section_mut)
            .find(|section| section.contains(id))
            .and_then(|section| section.parent_of_mut(id))
    }

    pub fn locate(&self, id: EntityId) -> Option<Location> {
        if id == self.root.id() {
            return Some(Location::Root);
        }
        if let Some(parent) = self.root.parent_of(id) {
            return Some(Location::Attached {
                parent: parent.id(),
            });
        }
        if self.detached.iter().any(|entity| entity.id() == id) {
            return Some(Location::Detached { parent: None });
        }
        self.get_parent(id).map(|parent| Location::Detached {
            parent: Some(parent.id()),
        })
    }

    pub fn is_attached(&self, id: EntityId) -> bool {
        matches!(
            self.locate(id),
            Some(Location::Root) | Some(Location::Attached { .. })
        )
    }

    /// Every id in the project: the root tree depth-first, then the detached pool.
    pub fn all_ids(&self) -> Vec<EntityId> {
        let mut ids = self.root.ids();
        for entity in &self.detached {
            ids.extend(entity.ids());
        }
        ids
    }

    fn ensure_new_ids(&self, ids: &[EntityId]) -> Result<()> {
        let mut seen = HashSet::new();
        for id in ids {
            if self.contains(*id) || !seen.insert(*id) {
                return Err(ShufflerError::DuplicateId(*id));
            }
        }
        Ok(())
    }

    // --- Structure ---

    /// Appends a new entity (with any subtree it carries) as the last child of `parent_id`.
    pub fn create(&mut self, parent_id: EntityId, entity: impl Into<Entity>) -> Result<EntityId> {
        let entity = entity.into();
        self.ensure_new_ids(&entity.ids())?;
        let id = entity.id();
        self.section_mut(parent_id)?.children.push(entity);
        debug!(%id, parent = %parent_id, "created entity");
        self.changed(ProjectEvent::Created {
            id,
            parent: parent_id,
        });
        Ok(id)
    }

    pub fn create_card(
        &mut self,
        parent_id: EntityId,
        summary: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<EntityId> {
        self.create(parent_id, Card::new(summary, content))
    }

    pub fn create_section(
        &mut self,
        parent_id: EntityId,
        summary: impl Into<String>,
    ) -> Result<EntityId> {
        self.create(parent_id, Section::new(summary))
    }

    /// Moves an entity and its subtree into the detached pool.
    ///
    /// The root cannot be detached and yields `Ok(None)`. An entity already at the pool's
    /// top level stays where it is.
    pub fn detach(&mut self, id: EntityId) -> Result<Option<&Entity>> {
        if id == self.root.id() {
            return Ok(None);
        }
        if let Some(pos) = self.detached.iter().position(|entity| entity.id() == id) {
            return Ok(self.detached.get(pos));
        }

        let parent = self
            .parent_of_mut(id)
            .ok_or(ShufflerError::EntityNotFound(id))?;
        let entity = parent.take(id).ok_or(ShufflerError::EntityNotFound(id))?;
        self.detached.push(entity);
        debug!(%id, "detached entity");
        self.changed(ProjectEvent::Detached { id });
        Ok(self.detached.last())
    }

    /// Appends an entity as the last child of `parent_id`, taking it from wherever it is.
    /// Works for detached entities and as a move within the root tree.
    pub fn attach(&mut self, id: EntityId, parent_id: EntityId) -> Result<()> {
        if id == self.root.id() {
            return Err(ShufflerError::InvalidOperation(
                "the root cannot be attached to another section".to_string(),
            ));
        }
        let entity = self.find(id).ok_or(ShufflerError::EntityNotFound(id))?;
        if id == parent_id || entity.contains(parent_id) {
            return Err(ShufflerError::Cycle {
                entity: id,
                parent: parent_id,
            });
        }
        self.section(parent_id)?;

        let entity = self
            .take_anywhere(id)
            .ok_or(ShufflerError::EntityNotFound(id))?;
        self.section_mut(parent_id)?.children.push(entity);
        debug!(%id, parent = %parent_id, "attached entity");
        self.changed(ProjectEvent::Attached {
            id,
            parent: parent_id,
        });
        Ok(())
    }

    fn take_anywhere(&mut self, id: EntityId) -> Option<Entity> {
        if self.root.contains(id) {
            return self.root.take(id);
        }
        if let Some(pos) = self.detached.iter().position(|entity| entity.id() == id) {
            return Some(self.detached.remove(pos));
        }
        self.detached
            .iter_mut()
            .filter_map(Entity::as_section_mut)
            .find_map(|section| section.take(id))
    }

    /// Removes a detached entity and its subtree for good.
    pub fn delete_detached(&mut self, id: EntityId) -> Result<Entity> {
        if !self.contains(id) {
            return Err(ShufflerError::EntityNotFound(id));
        }
        if self.is_attached(id) {
            return Err(ShufflerError::StillAttached(id));
        }
        let entity = self
            .take_anywhere(id)
            .ok_or(ShufflerError::EntityNotFound(id))?;
        debug!(%id, "deleted detached entity");
        self.changed(ProjectEvent::Deleted { id });
        Ok(entity)
    }

    /// Merges parsed tagged text into the live project.
    pub fn merge(&mut self, parsed: ParseResult) -> Result<MergeReport> {
        self.merge_load_result(parsed.into_load_result())
    }

    /// Appends the children of `incoming.root` to the live root and adds the unattached
    /// entities to the detached pool. The incoming root itself and its categories are
    /// dropped. Nothing changes if any incoming id already exists.
    pub fn merge_load_result(&mut self, incoming: LoadResult) -> Result<MergeReport> {
        let mut ids: Vec<EntityId> = Vec::new();
        for child in &incoming.root.children {
            ids.extend(child.ids());
        }
        for entity in &incoming.unattached {
            ids.extend(entity.ids());
        }
        self.ensure_new_ids(&ids)?;

        let report = MergeReport {
            attached: incoming.root.children.iter().map(Entity::id).collect(),
            detached: incoming.unattached.iter().map(Entity::id).collect(),
            total: ids.len(),
            warnings: incoming.warnings,
        };
        self.root.children.extend(incoming.root.children);
        self.detached.extend(incoming.unattached);

        debug!(
            attached = report.attached.len(),
            detached = report.detached.len(),
            total = report.total,
            "merged entities"
        );
        if report.total > 0 {
            self.changed(ProjectEvent::Merged {
                attached: report.attached.len(),
                detached: report.detached.len(),
            });
        }
        Ok(report)
    }

    /// Paints an entity above its siblings (its parent's children, or the pool's top level).
    pub fn bring_to_front(&mut self, id: EntityId) -> Result<()> {
        if id == self.root.id() {
            return Ok(());
        }
        let raised = if self.detached.iter().any(|entity| entity.id() == id) {
            model::bring_to_front(&mut self.detached, id)
        } else {
            self.parent_of_mut(id)
                .map(|parent| parent.bring_to_front(id))
                .unwrap_or(false)
        };
        if !raised {
            return Err(ShufflerError::EntityNotFound(id));
        }
        self.changed(ProjectEvent::Raised { id });
        Ok(())
    }

    /// Cards under a section in reading order.
    pub fn ordered_cards(&self, section_id: EntityId) -> Result<Vec<&Card>> {
        Ok(self.section(section_id)?.ordered_cards())
    }

    pub fn outline(&self, section_id: EntityId) -> Result<String> {
        Ok(self.section(section_id)?.outline())
    }

    // --- Fields ---

    /// Returns whether the value changed.
    pub fn set_summary(&mut self, id: EntityId, summary: impl Into<String>) -> Result<bool> {
        let summary = summary.into();
        let meta = self.meta_mut(id)?;
        if meta.summary == summary {
            return Ok(false);
        }
        meta.summary = summary;
        self.changed(ProjectEvent::Changed {
            id,
            field: Field::Summary,
        });
        Ok(true)
    }

    pub fn set_notes(&mut self, id: EntityId, notes: Option<String>) -> Result<bool> {
        let meta = self.meta_mut(id)?;
        if meta.notes == notes {
            return Ok(false);
        }
        meta.notes = notes;
        self.changed(ProjectEvent::Changed {
            id,
            field: Field::Notes,
        });
        Ok(true)
    }

    pub fn set_label(&mut self, id: EntityId, label: WorkflowLabel) -> Result<bool> {
        let meta = self.meta_mut(id)?;
        if meta.label == label {
            return Ok(false);
        }
        meta.label = label;
        self.changed(ProjectEvent::Changed {
            id,
            field: Field::Label,
        });
        Ok(true)
    }

    pub fn set_position(&mut self, id: EntityId, position: Position) -> Result<bool> {
        let meta = self.meta_mut(id)?;
        if meta.position == position {
            return Ok(false);
        }
        meta.position = position;
        self.changed(ProjectEvent::Changed {
            id,
            field: Field::Position,
        });
        Ok(true)
    }

    pub fn set_content(&mut self, id: EntityId, content: impl Into<String>) -> Result<bool> {
        let content = content.into();
        let card = self.card_mut(id)?;
        if card.content == content {
            return Ok(false);
        }
        card.content = content;
        self.changed(ProjectEvent::Changed {
            id,
            field: Field::Content,
        });
        Ok(true)
    }

    /// Unknown category ids are accepted; they resolve to no category.
    pub fn set_category(&mut self, id: EntityId, category: Option<CategoryId>) -> Result<bool> {
        let card = self.card_mut(id)?;
        if card.category == category {
            return Ok(false);
        }
        card.category = category;
        self.changed(ProjectEvent::Changed {
            id,
            field: Field::Category,
        });
        Ok(true)
    }

    /// Copies summary, notes, label and (card to card) content from `source` onto `id`.
    /// Identity, position and children are untouched.
    pub fn copy_values_from(&mut self, id: EntityId, source: &Entity) -> Result<bool> {
        let source_meta = source.meta();
        let mut changed = self.set_summary(id, source_meta.summary.clone())?;
        changed |= self.set_notes(id, source_meta.notes.clone())?;
        changed |= self.set_label(id, source_meta.label)?;
        if let Entity::Card(source_card) = source {
            if self.card(id).is_ok() {
                changed |= self.set_content(id, source_card.content.clone())?;
            }
        }
        Ok(changed)
    }

    // --- Categories ---

    /// The category a card points at, or `None` when unset or dangling.
    pub fn category_of(&self, card_id: EntityId) -> Option<&Category> {
        let card = self.card(card_id).ok()?;
        self.categories.resolve(card.category)
    }

    pub fn add_category(
        &mut self,
        name: impl Into<String>,
        color_name: impl Into<String>,
    ) -> CategoryId {
        let id = self.categories.add(name, color_name);
        self.changed(ProjectEvent::CategoriesChanged);
        id
    }

    /// Cards keep pointing at a removed category; the reference simply stops resolving.
    pub fn remove_category(&mut self, id: CategoryId) -> Result<Category> {
        let removed = self.categories.remove(id)?;
        self.changed(ProjectEvent::CategoriesChanged);
        Ok(removed)
    }

    pub fn rename_category(&mut self, id: CategoryId, name: impl Into<String>) -> Result<()> {
        self.categories.rename(id, name)?;
        self.changed(ProjectEvent::CategoriesChanged);
        Ok(())
    }

    pub fn set_category_color(
        &mut self,
        id: CategoryId,
        color_name: impl Into<String>,
    ) -> Result<()> {
        self.categories.set_color(id, color_name)?;
        self.changed(ProjectEvent::CategoriesChanged);
        Ok(())
    }
}
