use crate::commands::{CmdResult, EntityView};
use crate::document::Project;
use crate::error::{Result, ShufflerError};
use crate::model::{Entity, EntityId, EntityKind};

pub fn run(project: &Project, id: EntityId) -> Result<CmdResult> {
    let location = project
        .locate(id)
        .ok_or(ShufflerError::EntityNotFound(id))?;

    let view = if id == project.root_id() {
        let root = project.root();
        EntityView {
            id,
            kind: EntityKind::Section,
            summary: root.meta.summary.clone(),
            notes: root.meta.notes.clone(),
            label: root.meta.label,
            position: root.meta.position,
            location,
            children: root.children.len(),
            content: None,
            category: None,
        }
    } else {
        let entity = project.find(id).ok_or(ShufflerError::EntityNotFound(id))?;
        let meta = entity.meta();
        let (children, content) = match entity {
            Entity::Section(section) => (section.children.len(), None),
            Entity::Card(card) => (0, Some(card.content.clone())),
        };
        EntityView {
            id,
            kind: entity.kind(),
            summary: meta.summary.clone(),
            notes: meta.notes.clone(),
            label: meta.label,
            position: meta.position,
            location,
            children,
            content,
            category: project.category_of(id).cloned(),
        }
    };

    Ok(CmdResult::default().with_entity(view))
}
