use crate::categories::Category;
use crate::config::ShufflerConfig;
use crate::document::{Location, Project};
use crate::model::{EntityId, EntityKind, Position, WorkflowLabel};

pub mod add;
pub mod attach;
pub mod category;
pub mod config;
pub mod delete;
pub mod detach;
pub mod doctor;
pub mod export;
pub mod helpers;
pub mod import;
pub mod init;
pub mod show;
pub mod tree;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One line of the tree listing.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineRow {
    pub id: EntityId,
    pub kind: EntityKind,
    /// 0 for the root and for top-level detached entities.
    pub depth: usize,
    pub summary: String,
    pub label: WorkflowLabel,
    pub category: Option<String>,
    pub detached: bool,
}

/// Everything `show` reports about one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub summary: String,
    pub notes: Option<String>,
    pub label: WorkflowLabel,
    pub position: Position,
    pub location: Location,
    pub children: usize,
    pub content: Option<String>,
    pub category: Option<Category>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected: Vec<EntityId>,
    pub outline: Vec<OutlineRow>,
    pub entity: Option<EntityView>,
    pub categories: Vec<Category>,
    pub export: Option<String>,
    pub config: Option<ShufflerConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected(mut self, ids: Vec<EntityId>) -> Self {
        self.affected = ids;
        self
    }

    pub fn with_outline(mut self, rows: Vec<OutlineRow>) -> Self {
        self.outline = rows;
        self
    }

    pub fn with_entity(mut self, entity: EntityView) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_export(mut self, text: String) -> Self {
        self.export = Some(text);
        self
    }

    pub fn with_config(mut self, config: ShufflerConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Short display form of an id plus its summary, for messages.
pub(crate) fn describe(project: &Project, id: EntityId) -> String {
    let summary = project
        .meta(id)
        .map(|meta| meta.summary.as_str())
        .unwrap_or("?");
    format!("{} \"{}\"", helpers::short_id(id), summary)
}
