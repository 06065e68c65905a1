//! # Tagged-Text Parser
//!
//! Turns a flat text stream with HTML-comment markers into sections and cards:
//!
//! ```text
//! <!-- chapter 1::The Beginning -->     level 0 section "[1] The Beginning"
//! <!-- section l1::Arrival -->          level 1 section "Arrival"
//! <!-- card::The storm -->              card "The storm"
//! Rain hits the glass.                  card content
//! ```
//!
//! Markers are case-insensitive. A section marker at level L closes every open section at
//! level L or deeper, so a later `section l1` becomes a sibling of an earlier one while a
//! `section l2` nests under it. A card's body ends at the next marker of any kind.
//!
//! Parsing never touches storage. The result is converted to the loader's shape with
//! [`ParseResult::into_load_result`] and then merged into a live project.

use crate::categories::CategoryRegistry;
use crate::loader::{LoadResult, LoadWarning};
use crate::model::{Card, Entity, EntityId, EntityMeta, Section};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Summary of the synthetic root produced by [`ParseResult::into_load_result`].
pub const PARSED_ROOT_SUMMARY: &str = "Project Root";

static CHAPTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<!--\s*chapter\s+(.+)::(.*?)\s*-->").expect("valid chapter regex")
});
static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<!--\s*section\s+l(\d+)::(.*?)\s*-->").expect("valid section regex")
});
static CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!--\s*card::(.*?)\s*-->").expect("valid card regex"));

/// A parsed section: its own fields plus ordered child ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSection {
    pub meta: EntityMeta,
    pub children: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    /// Every card, in the order it was closed.
    pub cards: Vec<Card>,
    /// Every section, in the order it was closed (children before parents).
    pub sections: Vec<ParsedSection>,
    /// Sections closed with no enclosing section, in document order.
    pub top_level: Vec<EntityId>,
}

impl ParseResult {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.sections.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.cards.len() + self.sections.len()
    }

    /// Builds the loader's shape: a synthetic root whose children are the top-level
    /// sections, with everything else that nothing references (cards that appeared
    /// before any section) left unattached.
    pub fn into_load_result(self) -> LoadResult {
        let mut cards: HashMap<EntityId, Card> = HashMap::new();
        let card_order: Vec<EntityId> = self.cards.iter().map(Card::id).collect();
        for card in self.cards {
            cards.insert(card.id(), card);
        }
        let section_order: Vec<EntityId> = self.sections.iter().map(|s| s.meta.id).collect();
        let mut sections: HashMap<EntityId, ParsedSection> = HashMap::new();
        for section in self.sections {
            sections.insert(section.meta.id, section);
        }

        let mut assembly = Assembly {
            cards,
            sections,
            warnings: Vec::new(),
        };

        let mut root = Section::new(PARSED_ROOT_SUMMARY);
        for id in &self.top_level {
            match assembly.realize(*id) {
                Some(entity) => root.children.push(entity),
                None => assembly.warnings.push(LoadWarning::DanglingReference {
                    parent: root.id(),
                    child: *id,
                }),
            }
        }

        let mut unattached = Vec::new();
        for id in section_order {
            if let Some(entity) = assembly.realize(id) {
                unattached.push(entity);
            }
        }
        for id in card_order {
            if let Some(card) = assembly.cards.remove(&id) {
                unattached.push(Entity::Card(card));
            }
        }

        LoadResult::new(
            root,
            unattached,
            CategoryRegistry::default(),
            assembly.warnings,
        )
    }
}

struct Assembly {
    cards: HashMap<EntityId, Card>,
    sections: HashMap<EntityId, ParsedSection>,
    warnings: Vec<LoadWarning>,
}

impl Assembly {
    /// Takes an entity out of the pools, building sections recursively.
    fn realize(&mut self, id: EntityId) -> Option<Entity> {
        if let Some(card) = self.cards.remove(&id) {
            return Some(Entity::Card(card));
        }
        let parsed = self.sections.remove(&id)?;
        let mut section = Section::from_meta(parsed.meta);
        for child in parsed.children {
            match self.realize(child) {
                Some(entity) => section.children.push(entity),
                None => self.warnings.push(LoadWarning::DanglingReference {
                    parent: id,
                    child,
                }),
            }
        }
        Some(Entity::Section(section))
    }
}

struct OpenSection {
    level: u32,
    summary: String,
    children: Vec<EntityId>,
}

struct OpenCard {
    summary: String,
    content: String,
}

enum Marker {
    Section { level: u32, summary: String },
    Card { summary: String },
}

fn match_marker(line: &str) -> Option<Marker> {
    if let Some(caps) = CHAPTER_RE.captures(line) {
        return Some(Marker::Section {
            level: 0,
            summary: format!("[{}] {}", caps[1].trim(), caps[2].trim()),
        });
    }
    if let Some(caps) = SECTION_RE.captures(line) {
        // A level too large for u32 is not a marker.
        if let Ok(level) = caps[1].parse::<u32>() {
            return Some(Marker::Section {
                level,
                summary: caps[2].trim().to_string(),
            });
        }
    }
    CARD_RE.captures(line).map(|caps| Marker::Card {
        summary: caps[1].trim().to_string(),
    })
}

#[derive(Default)]
struct Parser {
    stack: Vec<OpenSection>,
    card: Option<OpenCard>,
    result: ParseResult,
}

impl Parser {
    fn finish_card(&mut self) {
        let Some(open) = self.card.take() else {
            return;
        };
        let card = Card::new(open.summary, open.content);
        if let Some(deepest) = self.stack.last_mut() {
            deepest.children.push(card.id());
        }
        self.result.cards.push(card);
    }

    fn finish_at_level(&mut self, level: u32) {
        while self.stack.last().is_some_and(|top| top.level >= level) {
            let Some(open) = self.stack.pop() else {
                break;
            };
            let meta = EntityMeta::new(open.summary);
            let id = meta.id;
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(id),
                None => self.result.top_level.push(id),
            }
            self.result.sections.push(ParsedSection {
                meta,
                children: open.children,
            });
        }
    }

    fn line(&mut self, line: &str) {
        let bare = line.trim_end_matches(['\n', '\r']);
        match match_marker(bare) {
            Some(Marker::Section { level, summary }) => {
                self.finish_card();
                self.finish_at_level(level);
                self.stack.push(OpenSection {
                    level,
                    summary,
                    children: Vec::new(),
                });
            }
            Some(Marker::Card { summary }) => {
                self.finish_card();
                self.card = Some(OpenCard {
                    summary,
                    content: String::new(),
                });
            }
            None => {
                if let Some(card) = self.card.as_mut() {
                    card.content.push_str(line);
                }
            }
        }
    }

    fn finish(mut self) -> ParseResult {
        self.finish_card();
        self.finish_at_level(0);
        self.result
    }
}

/// Parses tagged text into a flat result. Never fails: unmarked text outside a card is ignored.
pub fn parse(text: &str) -> ParseResult {
    let mut parser = Parser::default();
    for line in text.split_inclusive('\n') {
        parser.line(line);
    }
    parser.finish()
}
