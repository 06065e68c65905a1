//! # Project Loader
//!
//! Rebuilds a project tree from the flat file set written by [`crate::writer`].
//!
//! Files only reference each other by id, so loading is a reconstruction:
//!
//! 1. Read the manifest (root id, categories).
//! 2. Decode every card file and every section file into id-keyed tables.
//! 3. Realize the tree from the root id, following each section's child edges in order.
//!    A realized child takes its position from the parent's edge.
//! 4. Realize orphaned sections (present on disk but unreachable from the root) as detached
//!    top-level trees. Orphans may hang off other orphans, so selection repeats until every
//!    section record is built.
//! 5. Every card never reached becomes a detached top-level entity.
//!
//! Nothing present on disk is dropped. Content problems (undecodable files, dangling or
//! repeated child references, a missing root) never abort the load; they are logged and
//! returned as [`LoadWarning`]s. Storage failures and an unreadable manifest do abort.

use crate::categories::CategoryRegistry;
use crate::codec::{decode_card, decode_section, EntityCodec, SectionRecord, CARD_EXT, SECTION_EXT};
use crate::error::{Result, ShufflerError};
use crate::model::{Card, Entity, EntityId, EntityKind, EntityMeta, Position, Section};
use crate::store::StorageProvider;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// A recoverable problem found while loading.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadWarning {
    #[error("Skipped malformed file '{path}': {details}")]
    Malformed { path: PathBuf, details: String },

    #[error("Skipped '{path}': id {id} is already used by another file")]
    DuplicateRecord { path: PathBuf, id: EntityId },

    #[error("Section {parent} references missing child {child}")]
    DanglingReference { parent: EntityId, child: EntityId },

    #[error("Section {parent} references {child}, which already has a parent")]
    RepeatedReference { parent: EntityId, child: EntityId },

    #[error("Root section {0} not found, started an empty root")]
    MissingRoot(EntityId),

    #[error("Sections starting at {0} only reference each other, loaded as a detached tree")]
    OrphanCycle(EntityId),
}

impl LoadWarning {
    /// True when the file behind the warning was not loaded, so a full rewrite would drop it.
    pub fn skips_file(&self) -> bool {
        matches!(
            self,
            LoadWarning::Malformed { .. } | LoadWarning::DuplicateRecord { .. }
        )
    }
}

/// A reconstructed project, or the load-shaped form of a parse.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub root: Section,
    pub unattached: Vec<Entity>,
    /// Kind of every entity in `root` and `unattached`.
    pub index: HashMap<EntityId, EntityKind>,
    pub categories: CategoryRegistry,
    pub warnings: Vec<LoadWarning>,
}

impl LoadResult {
    pub(crate) fn new(
        root: Section,
        unattached: Vec<Entity>,
        categories: CategoryRegistry,
        warnings: Vec<LoadWarning>,
    ) -> Self {
        let mut index = HashMap::new();
        index_section(&root, &mut index);
        for entity in &unattached {
            index_entity(entity, &mut index);
        }
        Self {
            root,
            unattached,
            index,
            categories,
            warnings,
        }
    }

    /// Every id in the result: the root tree first, then the unattached trees.
    pub fn all_ids(&self) -> Vec<EntityId> {
        let mut ids = self.root.ids();
        for entity in &self.unattached {
            ids.extend(entity.ids());
        }
        ids
    }
}

fn index_section(section: &Section, index: &mut HashMap<EntityId, EntityKind>) {
    index.insert(section.id(), EntityKind::Section);
    for child in &section.children {
        index_entity(child, index);
    }
}

fn index_entity(entity: &Entity, index: &mut HashMap<EntityId, EntityKind>) {
    match entity {
        Entity::Section(section) => index_section(section, index),
        Entity::Card(card) => {
            index.insert(card.id(), EntityKind::Card);
        }
    }
}

pub struct ProjectLoader<S: StorageProvider> {
    storage: S,
}

impl<S: StorageProvider> ProjectLoader<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn load(&self, project_path: &Path) -> Result<LoadResult> {
        let codec = EntityCodec::new(&self.storage);
        let manifest = codec.read_manifest(project_path)?;

        let mut build = Build::default();
        build.read_cards(&codec, &codec.cards_dir(project_path))?;
        build.read_sections(&codec, &codec.sections_dir(project_path))?;
        debug!(
            sections = build.section_order.len(),
            cards = build.card_order.len(),
            "decoded entity files"
        );

        let root = build.realize_root(manifest.root_id);
        let mut unattached = build.realize_orphan_sections();
        unattached.extend(build.take_unbuilt_cards());

        for warning in &build.warnings {
            warn!("{}", warning);
        }
        debug!(detached = unattached.len(), "project loaded");

        Ok(LoadResult::new(
            root,
            unattached,
            CategoryRegistry::new(manifest.categories),
            build.warnings,
        ))
    }
}

#[derive(Default)]
struct Build {
    sections: HashMap<EntityId, SectionRecord>,
    section_order: Vec<EntityId>,
    cards: HashMap<EntityId, Card>,
    card_order: Vec<EntityId>,
    built: HashSet<EntityId>,
    warnings: Vec<LoadWarning>,
}

impl Build {
    fn read_cards<S: StorageProvider>(&mut self, codec: &EntityCodec<S>, dir: &Path) -> Result<()> {
        for path in sorted_files(codec, dir, CARD_EXT)? {
            let text = codec.storage().get(&path)?;
            match decode_card(&text, &path) {
                Ok(card) => {
                    let id = card.id();
                    if self.cards.contains_key(&id) {
                        self.warnings.push(LoadWarning::DuplicateRecord { path, id });
                        continue;
                    }
                    self.card_order.push(id);
                    self.cards.insert(id, card);
                }
                Err(e) => self.warnings.push(malformed(path, e)),
            }
        }
        Ok(())
    }

    fn read_sections<S: StorageProvider>(
        &mut self,
        codec: &EntityCodec<S>,
        dir: &Path,
    ) -> Result<()> {
        for path in sorted_files(codec, dir, SECTION_EXT)? {
            let text = codec.storage().get(&path)?;
            match decode_section(&text, &path) {
                Ok(record) => {
                    let id = record.id;
                    if self.cards.contains_key(&id) || self.sections.contains_key(&id) {
                        self.warnings.push(LoadWarning::DuplicateRecord { path, id });
                        continue;
                    }
                    self.section_order.push(id);
                    self.sections.insert(id, record);
                }
                Err(e) => self.warnings.push(malformed(path, e)),
            }
        }
        Ok(())
    }

    fn realize_root(&mut self, root_id: EntityId) -> Section {
        if self.sections.contains_key(&root_id) {
            return self.realize_section(root_id);
        }
        self.warnings.push(LoadWarning::MissingRoot(root_id));
        // A card may own the id; never reuse it for the root then.
        let id = if self.cards.contains_key(&root_id) {
            Uuid::new_v4()
        } else {
            root_id
        };
        self.built.insert(id);
        Section::from_meta(EntityMeta::with_id(id, "Project Root"))
    }

    fn realize_section(&mut self, id: EntityId) -> Section {
        self.built.insert(id);
        let record = match self.sections.get(&id) {
            Some(record) => record.clone(),
            None => return Section::from_meta(EntityMeta::with_id(id, "")),
        };

        let mut section = Section::from_meta(record.to_meta());
        for edge in &record.children {
            if self.built.contains(&edge.id) {
                self.warnings.push(LoadWarning::RepeatedReference {
                    parent: id,
                    child: edge.id,
                });
                continue;
            }
            match self.realize(edge.id) {
                Some(mut child) => {
                    child.meta_mut().position = Position::new(edge.x, edge.y);
                    section.children.push(child);
                }
                None => self.warnings.push(LoadWarning::DanglingReference {
                    parent: id,
                    child: edge.id,
                }),
            }
        }
        section
    }

    fn realize(&mut self, id: EntityId) -> Option<Entity> {
        if let Some(card) = self.cards.remove(&id) {
            self.built.insert(id);
            return Some(Entity::Card(card));
        }
        if self.sections.contains_key(&id) {
            return Some(Entity::Section(self.realize_section(id)));
        }
        None
    }

    fn realize_orphan_sections(&mut self) -> Vec<Entity> {
        let mut detached = Vec::new();
        loop {
            let remaining: Vec<EntityId> = self
                .section_order
                .iter()
                .filter(|id| !self.built.contains(id))
                .copied()
                .collect();
            if remaining.is_empty() {
                break;
            }

            let referenced: HashSet<EntityId> = self
                .sections
                .values()
                .flat_map(|record| {
                    record
                        .children
                        .iter()
                        .filter(move |edge| edge.id != record.id)
                        .map(|edge| edge.id)
                })
                .collect();

            let mut orphans: Vec<EntityId> = remaining
                .iter()
                .filter(|id| !referenced.contains(id))
                .copied()
                .collect();
            if orphans.is_empty() {
                self.warnings.push(LoadWarning::OrphanCycle(remaining[0]));
                orphans.push(remaining[0]);
            }

            for id in orphans {
                // An earlier orphan in this round may already have pulled it in.
                if !self.built.contains(&id) {
                    detached.push(Entity::Section(self.realize_section(id)));
                }
            }
        }
        detached
    }

    fn take_unbuilt_cards(&mut self) -> Vec<Entity> {
        let order = std::mem::take(&mut self.card_order);
        order
            .into_iter()
            .filter_map(|id| self.cards.remove(&id))
            .map(|card| {
                self.built.insert(card.id());
                Entity::Card(card)
            })
            .collect()
    }
}

fn sorted_files<S: StorageProvider>(
    codec: &EntityCodec<S>,
    dir: &Path,
    ext: &str,
) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = codec
        .storage()
        .list(dir)?
        .into_iter()
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(ext))
        .collect();
    files.sort();
    Ok(files)
}

fn malformed(path: PathBuf, error: ShufflerError) -> LoadWarning {
    let details = match error {
        ShufflerError::MalformedEntity { details, .. } => details,
        other => other.to_string(),
    };
    LoadWarning::Malformed { path, details }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_card, encode_manifest, encode_section, Manifest};
    use crate::store::memory::MemoryStorage;

    const BASE: &str = "book";

    fn put_section(storage: &MemoryStorage, section: &Section) {
        storage
            .put(
                &Path::new(BASE).join(format!("sections/{}.yaml", section.id())),
                &encode_section(section).unwrap(),
            )
            .unwrap();
    }

    fn put_card(storage: &MemoryStorage, card: &Card) {
        storage
            .put(
                &Path::new(BASE).join(format!("cards/{}.md", card.id())),
                &encode_card(card).unwrap(),
            )
            .unwrap();
    }

    fn put_manifest(storage: &MemoryStorage, root_id: EntityId) {
        let manifest = Manifest {
            root_id,
            categories: vec![],
        };
        storage
            .put(
                &Path::new(BASE).join("project.yaml"),
                &encode_manifest(&manifest).unwrap(),
            )
            .unwrap();
    }

    fn load(storage: &MemoryStorage) -> LoadResult {
        ProjectLoader::new(storage).load(Path::new(BASE)).unwrap()
    }

    #[test]
    fn test_missing_manifest_is_storage_error() {
        let storage = MemoryStorage::new();
        let err = ProjectLoader::new(&storage)
            .load(Path::new(BASE))
            .unwrap_err();
        assert!(matches!(err, crate::error::ShufflerError::Storage { .. }));
    }

    #[test]
    fn test_children_keep_file_order_and_edge_positions() {
        let storage = MemoryStorage::new();
        let mut root = Section::new("Root");
        let mut first = Card::new("first", "1");
        first.meta.position = Position::new(10.0, 20.0);
        let second = Card::new("second", "2");
        put_card(&storage, &first);
        put_card(&storage, &second);
        root.push(first.clone());
        root.push(second.clone());
        put_section(&storage, &root);
        put_manifest(&storage, root.id());

        let result = load(&storage);
        assert!(result.warnings.is_empty());
        let ids: Vec<_> = result.root.children.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![first.id(), second.id()]);
        assert_eq!(
            result.root.children[0].meta().position,
            Position::new(10.0, 20.0)
        );
        assert!(result.unattached.is_empty());
        assert_eq!(result.index.len(), 3);
        assert_eq!(result.categories.len(), 1);
    }

    #[test]
    fn test_orphan_chains_become_single_detached_trees() {
        let storage = MemoryStorage::new();
        let root = Section::new("Root");
        put_section(&storage, &root);
        put_manifest(&storage, root.id());

        // orphan_top -> orphan_mid -> orphan_leaf (all unreachable from root)
        let leaf_card = Card::new("deep", "");
        let mut orphan_leaf = Section::new("leaf");
        orphan_leaf.push(leaf_card.clone());
        let mut orphan_mid = Section::new("mid");
        orphan_mid.push(orphan_leaf.clone());
        let mut orphan_top = Section::new("top");
        orphan_top.push(orphan_mid.clone());
        for section in [&orphan_leaf, &orphan_mid, &orphan_top] {
            put_section(&storage, section);
        }
        put_card(&storage, &leaf_card);
        let loose = Card::new("loose", "");
        put_card(&storage, &loose);

        let result = load(&storage);
        assert_eq!(result.unattached.len(), 2);
        let top = result
            .unattached
            .iter()
            .find(|e| e.id() == orphan_top.id())
            .unwrap();
        assert!(top.contains(leaf_card.id()));
        assert!(result.unattached.iter().any(|e| e.id() == loose.id()));

        let mut ids = result.all_ids();
        assert_eq!(ids.len(), 6);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_dangling_reference_is_skipped_with_warning() {
        let storage = MemoryStorage::new();
        let mut root = Section::new("Root");
        let ghost = Card::new("ghost", "");
        let real = Card::new("real", "");
        root.push(ghost.clone());
        root.push(real.clone());
        put_section(&storage, &root);
        put_card(&storage, &real);
        put_manifest(&storage, root.id());

        let result = load(&storage);
        assert_eq!(result.root.children.len(), 1);
        assert_eq!(
            result.warnings,
            vec![LoadWarning::DanglingReference {
                parent: root.id(),
                child: ghost.id()
            }]
        );
    }

    #[test]
    fn test_malformed_card_is_reported_and_skipped() {
        let storage = MemoryStorage::new();
        let root = Section::new("Root");
        put_section(&storage, &root);
        put_manifest(&storage, root.id());
        let bad = Path::new(BASE).join("cards/broken.md");
        storage.put(&bad, "no front matter here").unwrap();

        let result = load(&storage);
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            &result.warnings[0],
            LoadWarning::Malformed { path, .. } if path == &bad
        ));
        assert!(result.unattached.is_empty());
    }

    #[test]
    fn test_cycles_and_shared_children_do_not_duplicate() {
        let storage = MemoryStorage::new();
        let card = Card::new("shared", "");
        let mut a = Section::new("a");
        let mut b = Section::new("b");
        // a -> b -> a is a detached cycle; both also claim the card.
        a.push(card.clone());
        b.push(card.clone());
        b.push(Section::from_meta(a.meta.clone()));
        a.push(Section::from_meta(b.meta.clone()));
        let root = Section::new("Root");
        for section in [&root, &a, &b] {
            put_section(&storage, section);
        }
        put_card(&storage, &card);
        put_manifest(&storage, root.id());

        let result = load(&storage);
        assert_eq!(result.unattached.len(), 1);
        let mut ids = result.all_ids();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, LoadWarning::OrphanCycle(_))));
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, LoadWarning::RepeatedReference { .. })));
    }

    #[test]
    fn test_missing_root_starts_empty_root() {
        let storage = MemoryStorage::new();
        let root_id = Uuid::new_v4();
        put_manifest(&storage, root_id);
        let card = Card::new("c", "");
        put_card(&storage, &card);

        let result = load(&storage);
        assert_eq!(result.root.id(), root_id);
        assert!(result.root.children.is_empty());
        assert_eq!(result.warnings, vec![LoadWarning::MissingRoot(root_id)]);
        assert_eq!(result.unattached.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_across_files_are_skipped() {
        let storage = MemoryStorage::new();
        let root = Section::new("Root");
        put_section(&storage, &root);
        put_manifest(&storage, root.id());
        let card = Card::new("c", "");
        put_card(&storage, &card);
        let clash = Section::from_meta(card.meta.clone());
        put_section(&storage, &clash);

        let result = load(&storage);
        assert!(matches!(
            result.warnings.as_slice(),
            [LoadWarning::DuplicateRecord { id, .. }] if *id == card.id()
        ));
        assert_eq!(result.all_ids().len(), 2);
    }
}
