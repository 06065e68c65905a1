//! # Entity Model
//!
//! A project is a tree of two node kinds:
//!
//! - [`Section`]: a grouping (chapter, scene list, ...) that owns an **ordered** list of children.
//! - [`Card`]: a leaf holding the actual prose plus an optional category reference.
//!
//! Both share [`EntityMeta`] (identity, summary, notes, workflow label, visual placement).
//! [`Entity`] is the closed sum of the two, so "a card with children" cannot be expressed.
//!
//! Children are owned by value. A subtree moves as a unit when it is detached or attached,
//! and cycles are unrepresentable in memory.
//!
//! Tree searches are plain depth-first walks. Projects hold tens to a few hundred
//! entities, so no parent index is maintained.

use crate::categories::CategoryId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type EntityId = Uuid;

/// Workflow status carried by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkflowLabel {
    #[default]
    ToDo,
    InProgress,
    Review,
    Done,
}

impl WorkflowLabel {
    pub const ALL: [WorkflowLabel; 4] = [
        WorkflowLabel::ToDo,
        WorkflowLabel::InProgress,
        WorkflowLabel::Review,
        WorkflowLabel::Done,
    ];
}

impl fmt::Display for WorkflowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowLabel::ToDo => "todo",
            WorkflowLabel::InProgress => "in-progress",
            WorkflowLabel::Review => "review",
            WorkflowLabel::Done => "done",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for WorkflowLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "todo" => Ok(WorkflowLabel::ToDo),
            "inprogress" | "wip" => Ok(WorkflowLabel::InProgress),
            "review" => Ok(WorkflowLabel::Review),
            "done" => Ok(WorkflowLabel::Done),
            _ => Err(format!(
                "Invalid label: {} (expected todo, in-progress, review or done)",
                s
            )),
        }
    }
}

/// Canvas placement. Purely visual; never affects structure.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Section,
    Card,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Section => write!(f, "section"),
            EntityKind::Card => write!(f, "card"),
        }
    }
}

/// Fields shared by sections and cards.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMeta {
    pub id: EntityId,
    pub summary: String,
    pub notes: Option<String>,
    pub label: WorkflowLabel,
    pub position: Position,
    /// Paint order among siblings; not persisted.
    pub z: i32,
}

impl EntityMeta {
    pub fn new(summary: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), summary)
    }

    pub fn with_id(id: EntityId, summary: impl Into<String>) -> Self {
        Self {
            id,
            summary: summary.into(),
            notes: None,
            label: WorkflowLabel::default(),
            position: Position::default(),
            z: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub meta: EntityMeta,
    pub content: String,
    pub category: Option<CategoryId>,
}

impl Card {
    pub fn new(summary: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(summary),
            content: content.into(),
            category: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub meta: EntityMeta,
    pub children: Vec<Entity>,
}

impl Section {
    pub fn new(summary: impl Into<String>) -> Self {
        Self::from_meta(EntityMeta::new(summary))
    }

    pub fn from_meta(meta: EntityMeta) -> Self {
        Self {
            meta,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    pub fn push(&mut self, child: impl Into<Entity>) {
        self.children.push(child.into());
    }

    /// Finds a descendant (not `self`) by id.
    pub fn find(&self, id: EntityId) -> Option<&Entity> {
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.find(id).is_some()
    }

    /// Finds the section that lists `id` as a direct child, searching this subtree.
    pub fn parent_of(&self, id: EntityId) -> Option<&Section> {
        if self.children.iter().any(|child| child.id() == id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Entity::Section(section) => section.parent_of(id),
            Entity::Card(_) => None,
        })
    }

    pub fn parent_of_mut(&mut self, id: EntityId) -> Option<&mut Section> {
        if self.children.iter().any(|child| child.id() == id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| match child {
            Entity::Section(section) => section.parent_of_mut(id),
            Entity::Card(_) => None,
        })
    }

    /// Removes a descendant (with its subtree) from wherever it sits below this section.
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        if let Some(pos) = self.children.iter().position(|child| child.id() == id) {
            return Some(self.children.remove(pos));
        }
        self.children.iter_mut().find_map(|child| match child {
            Entity::Section(section) => section.take(id),
            Entity::Card(_) => None,
        })
    }

    /// Ids of this section and every descendant, depth-first.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids = vec![self.id()];
        for child in &self.children {
            child.collect_ids(&mut ids);
        }
        ids
    }

    /// All cards below this section in reading order.
    pub fn ordered_cards(&self) -> Vec<&Card> {
        let mut cards = Vec::new();
        collect_cards(self, &mut cards);
        cards
    }

    /// One line per child summary.
    pub fn outline(&self) -> String {
        self.children
            .iter()
            .map(|child| child.meta().summary.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Raises a direct child above its siblings. Returns false if `id` is not a direct child.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        bring_to_front(&mut self.children, id)
    }
}

/// Raises `id` above every other entry of `siblings`: each sibling at or above its old z
/// drops by one and `id` takes the top z plus one.
pub fn bring_to_front(siblings: &mut [Entity], id: EntityId) -> bool {
    let old_z = match siblings.iter().find(|child| child.id() == id) {
        Some(child) => child.meta().z,
        None => return false,
    };
    for child in siblings.iter_mut() {
        let meta = child.meta_mut();
        if meta.z >= old_z {
            meta.z -= 1;
        }
    }
    let top = siblings
        .iter()
        .filter(|child| child.id() != id)
        .map(|child| child.meta().z)
        .max()
        .unwrap_or(0);
    if let Some(child) = siblings.iter_mut().find(|child| child.id() == id) {
        child.meta_mut().z = top + 1;
    }
    true
}

fn collect_cards<'a>(section: &'a Section, cards: &mut Vec<&'a Card>) {
    for child in &section.children {
        match child {
            Entity::Card(card) => cards.push(card),
            Entity::Section(inner) => collect_cards(inner, cards),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Section(Section),
    Card(Card),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.meta().id
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Section(_) => EntityKind::Section,
            Entity::Card(_) => EntityKind::Card,
        }
    }

    pub fn meta(&self) -> &EntityMeta {
        match self {
            Entity::Section(section) => &section.meta,
            Entity::Card(card) => &card.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut EntityMeta {
        match self {
            Entity::Section(section) => &mut section.meta,
            Entity::Card(card) => &mut card.meta,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Entity::Section(section) => Some(section),
            Entity::Card(_) => None,
        }
    }

    pub fn as_section_mut(&mut self) -> Option<&mut Section> {
        match self {
            Entity::Section(section) => Some(section),
            Entity::Card(_) => None,
        }
    }

    pub fn as_card(&self) -> Option<&Card> {
        match self {
            Entity::Card(card) => Some(card),
            Entity::Section(_) => None,
        }
    }

    pub fn as_card_mut(&mut self) -> Option<&mut Card> {
        match self {
            Entity::Card(card) => Some(card),
            Entity::Section(_) => None,
        }
    }

    /// Finds `id` in this subtree, including `self`.
    pub fn find(&self, id: EntityId) -> Option<&Entity> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Entity::Section(section) => section.find(id),
            Entity::Card(_) => None,
        }
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Entity::Section(section) => section.find_mut(id),
            Entity::Card(_) => None,
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.find(id).is_some()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<EntityId>) {
        ids.push(self.id());
        if let Entity::Section(section) = self {
            for child in &section.children {
                child.collect_ids(ids);
            }
        }
    }
}

impl From<Section> for Entity {
    fn from(section: Section) -> Self {
        Entity::Section(section)
    }
}

impl From<Card> for Entity {
    fn from(card: Card) -> Self {
        Entity::Card(card)
    }
}
