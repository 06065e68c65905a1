//! # Entity Codec
//!
//! Maps a single entity to exactly one file and back.
//!
//! ## Section files (`sections/{uuid}.yaml`)
//!
//! ```yaml
//! id: 0b5c4c9e-...
//! summary: Act One
//! notes: null
//! label: InProgress
//! children:
//!   - id: 6f1d...
//!     x: 120.0
//!     y: 40.0
//! ```
//!
//! A section stores only the identity and canvas position of each child, never child
//! content. Positions live on the parent's edge list, not in the child's own file.
//!
//! ## Card files (`cards/{uuid}.md`)
//!
//! ```text
//! ---
//! id: 6f1d...
//! summary: The storm
//! notes: null
//! label: ToDo
//! categoryId: 2
//! ---
//! Raw card content, kept verbatim.
//! ```
//!
//! Unknown fields are ignored on read so newer files load in older builds.

use crate::categories::{Category, CategoryId};
use crate::error::{Result, ShufflerError};
use crate::model::{Card, Entity, EntityId, EntityMeta, Section, WorkflowLabel};
use crate::store::StorageProvider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "project.yaml";
pub const SECTIONS_DIR: &str = "sections";
pub const CARDS_DIR: &str = "cards";
pub const SECTION_EXT: &str = "yaml";
pub const CARD_EXT: &str = "md";

const FRONT_MATTER_DELIMITER: &str = "---";

/// One `{id, x, y}` entry of a section's child list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildEdge {
    pub id: EntityId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// A section as stored on disk: its own fields plus child edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: EntityId,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub label: WorkflowLabel,
    #[serde(default)]
    pub children: Vec<ChildEdge>,
}

impl SectionRecord {
    pub fn from_section(section: &Section) -> Self {
        Self {
            id: section.meta.id,
            summary: section.meta.summary.clone(),
            notes: section.meta.notes.clone(),
            label: section.meta.label,
            children: section
                .children
                .iter()
                .map(|child| {
                    let meta = child.meta();
                    ChildEdge {
                        id: meta.id,
                        x: meta.position.x,
                        y: meta.position.y,
                    }
                })
                .collect(),
        }
    }

    /// The section's own fields, without children.
    pub fn to_meta(&self) -> EntityMeta {
        let mut meta = EntityMeta::with_id(self.id, self.summary.clone());
        meta.notes = self.notes.clone();
        meta.label = self.label;
        meta
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardFrontMatter {
    id: EntityId,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    label: WorkflowLabel,
    // Older files use -1 for "no category".
    #[serde(default)]
    category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub root_id: EntityId,
    #[serde(default)]
    pub categories: Vec<Category>,
}

pub fn encode_section(section: &Section) -> Result<String> {
    serde_yaml::to_string(&SectionRecord::from_section(section))
        .map_err(|e| ShufflerError::malformed(section_file_name(section.id()), e))
}

pub fn decode_section(text: &str, path: &Path) -> Result<SectionRecord> {
    serde_yaml::from_str(text).map_err(|e| ShufflerError::malformed(path, e))
}

pub fn encode_card(card: &Card) -> Result<String> {
    let front = CardFrontMatter {
        id: card.meta.id,
        summary: card.meta.summary.clone(),
        notes: card.meta.notes.clone(),
        label: card.meta.label,
        category_id: card.category.map(i64::from),
    };
    let yaml = serde_yaml::to_string(&front)
        .map_err(|e| ShufflerError::malformed(card_file_name(card.id()), e))?;
    Ok(format!(
        "{delim}\n{yaml}{delim}\n{content}",
        delim = FRONT_MATTER_DELIMITER,
        yaml = yaml,
        content = card.content
    ))
}

pub fn decode_card(text: &str, path: &Path) -> Result<Card> {
    let (front, content) = split_front_matter(text)
        .ok_or_else(|| ShufflerError::malformed(path, "missing front matter delimiters"))?;
    let front: CardFrontMatter =
        serde_yaml::from_str(front).map_err(|e| ShufflerError::malformed(path, e))?;

    let mut meta = EntityMeta::with_id(front.id, front.summary);
    meta.notes = front.notes;
    meta.label = front.label;
    Ok(Card {
        meta,
        content: content.to_string(),
        category: front
            .category_id
            .and_then(|id| CategoryId::try_from(id).ok()),
    })
}

/// Splits `---\n<front>\n---\n<body>` into front and body. The body is returned verbatim.
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if !is_delimiter(first) {
        return None;
    }

    let front_start = first.len();
    let mut offset = front_start;
    for line in lines {
        if is_delimiter(line) {
            return Some((&text[front_start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == FRONT_MATTER_DELIMITER
}

pub fn encode_manifest(manifest: &Manifest) -> Result<String> {
    serde_yaml::to_string(manifest).map_err(|e| ShufflerError::malformed(MANIFEST_FILE, e))
}

pub fn decode_manifest(text: &str, path: &Path) -> Result<Manifest> {
    serde_yaml::from_str(text).map_err(|e| ShufflerError::malformed(path, e))
}

pub fn section_file_name(id: EntityId) -> String {
    format!("{}.{}", id, SECTION_EXT)
}

pub fn card_file_name(id: EntityId) -> String {
    format!("{}.{}", id, CARD_EXT)
}

/// A single decoded file.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Section(SectionRecord),
    Card(Card),
}

/// Reads and writes single entity files through a [`StorageProvider`].
pub struct EntityCodec<S: StorageProvider> {
    storage: S,
}

impl<S: StorageProvider> EntityCodec<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn manifest_path(&self, base: &Path) -> PathBuf {
        self.storage.join(base, &[MANIFEST_FILE])
    }

    pub fn sections_dir(&self, base: &Path) -> PathBuf {
        self.storage.join(base, &[SECTIONS_DIR])
    }

    pub fn cards_dir(&self, base: &Path) -> PathBuf {
        self.storage.join(base, &[CARDS_DIR])
    }

    pub fn entity_path(&self, base: &Path, entity: &Entity) -> PathBuf {
        match entity {
            Entity::Section(section) => self.section_path(base, section.id()),
            Entity::Card(card) => self.card_path(base, card.id()),
        }
    }

    pub fn section_path(&self, base: &Path, id: EntityId) -> PathBuf {
        self.storage
            .join(base, &[SECTIONS_DIR, &section_file_name(id)])
    }

    pub fn card_path(&self, base: &Path, id: EntityId) -> PathBuf {
        self.storage.join(base, &[CARDS_DIR, &card_file_name(id)])
    }

    /// Writes exactly one file for `entity`. Children are not written.
    pub fn serialize(&self, entity: &Entity, base: &Path) -> Result<()> {
        match entity {
            Entity::Section(section) => self.write_section(section, base),
            Entity::Card(card) => self.write_card(card, base),
        }
    }

    pub fn write_section(&self, section: &Section, base: &Path) -> Result<()> {
        let path = self.section_path(base, section.id());
        self.storage.put(&path, &encode_section(section)?)
    }

    pub fn write_card(&self, card: &Card, base: &Path) -> Result<()> {
        let path = self.card_path(base, card.id());
        self.storage.put(&path, &encode_card(card)?)
    }

    /// Decodes one file, dispatching on its extension.
    pub fn deserialize(&self, path: &Path) -> Result<Decoded> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(CARD_EXT) => self.read_card(path).map(Decoded::Card),
            Some(SECTION_EXT) => self.read_section(path).map(Decoded::Section),
            _ => Err(ShufflerError::malformed(path, "unknown entity file type")),
        }
    }

    pub fn read_section(&self, path: &Path) -> Result<SectionRecord> {
        let text = self.storage.get(path)?;
        decode_section(&text, path)
    }

    pub fn read_card(&self, path: &Path) -> Result<Card> {
        let text = self.storage.get(path)?;
        decode_card(&text, path)
    }

    pub fn read_manifest(&self, base: &Path) -> Result<Manifest> {
        let path = self.manifest_path(base);
        let text = self.storage.get(&path)?;
        decode_manifest(&text, &path)
    }

    pub fn write_manifest(&self, base: &Path, manifest: &Manifest) -> Result<()> {
        let path = self.manifest_path(base);
        self.storage.put(&path, &encode_manifest(manifest)?)
    }
}
