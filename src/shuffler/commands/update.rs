use crate::categories::CategoryId;
use crate::commands::{describe, CmdMessage, CmdResult};
use crate::document::Project;
use crate::error::Result;
use crate::model::{EntityId, Position, WorkflowLabel};

/// Field changes for one entity. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityUpdate {
    pub summary: Option<String>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
    pub label: Option<WorkflowLabel>,
    pub content: Option<String>,
    /// `Some(None)` clears the category.
    pub category: Option<Option<CategoryId>>,
    pub position: Option<Position>,
}

impl EntityUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub fn run(project: &mut Project, id: EntityId, update: EntityUpdate) -> Result<CmdResult> {
    let mut changed = Vec::new();

    if let Some(summary) = update.summary {
        if project.set_summary(id, summary)? {
            changed.push("summary");
        }
    }
    if let Some(notes) = update.notes {
        if project.set_notes(id, notes)? {
            changed.push("notes");
        }
    }
    if let Some(label) = update.label {
        if project.set_label(id, label)? {
            changed.push("label");
        }
    }
    if let Some(content) = update.content {
        if project.set_content(id, content)? {
            changed.push("content");
        }
    }
    if let Some(category) = update.category {
        if project.set_category(id, category)? {
            changed.push("category");
        }
    }
    if let Some(position) = update.position {
        if project.set_position(id, position)? {
            changed.push("position");
        }
    }

    let mut result = CmdResult::default();
    if changed.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Nothing changed for {}",
            describe(project, id)
        )));
    } else {
        result.affected.push(id);
        result.add_message(CmdMessage::success(format!(
            "Updated {}: {}",
            describe(project, id),
            changed.join(", ")
        )));
    }
    Ok(result)
}
