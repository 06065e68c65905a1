use crate::commands::{CmdResult, OutlineRow};
use crate::document::Project;
use crate::error::Result;
use crate::model::{Entity, EntityKind, Section};

/// Lists the root tree depth-first, then every detached tree.
pub fn run(project: &Project) -> Result<CmdResult> {
    let mut rows = Vec::new();
    push_section(project, project.root(), 0, false, &mut rows);
    for entity in project.detached() {
        push_entity(project, entity, 0, true, &mut rows);
    }
    Ok(CmdResult::default().with_outline(rows))
}

fn push_section(
    project: &Project,
    section: &Section,
    depth: usize,
    detached: bool,
    rows: &mut Vec<OutlineRow>,
) {
    rows.push(OutlineRow {
        id: section.id(),
        kind: EntityKind::Section,
        depth,
        summary: section.meta.summary.clone(),
        label: section.meta.label,
        category: None,
        detached,
    });
    for child in &section.children {
        push_entity(project, child, depth + 1, detached, rows);
    }
}

fn push_entity(
    project: &Project,
    entity: &Entity,
    depth: usize,
    detached: bool,
    rows: &mut Vec<OutlineRow>,
) {
    match entity {
        Entity::Section(section) => push_section(project, section, depth, detached, rows),
        Entity::Card(card) => rows.push(OutlineRow {
            id: card.id(),
            kind: EntityKind::Card,
            depth,
            summary: card.meta.summary.clone(),
            label: card.meta.label,
            category: project.category_of(card.id()).map(|c| c.name.clone()),
            detached,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_project;

    #[test]
    fn test_tree_rows_in_reading_order() {
        let sample = sample_project();
        let result = run(&sample.project).unwrap();
        let rows: Vec<_> = result
            .outline
            .iter()
            .map(|r| (r.summary.as_str(), r.depth, r.detached))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Project Root", 0, false),
                ("Act One", 1, false),
                ("The storm", 2, false),
                ("The calm", 2, false),
                ("Act Two", 1, false),
                ("Loose idea", 0, true),
            ]
        );
        assert_eq!(result.outline[2].category.as_deref(), Some("Plot"));
        assert_eq!(result.outline[3].category, None);
    }
}
