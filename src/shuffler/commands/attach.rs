use crate::commands::{describe, CmdMessage, CmdResult};
use crate::document::Project;
use crate::error::Result;
use crate::model::EntityId;

/// Attaches (or moves) `id` to the end of `parent`'s children.
pub fn run(project: &mut Project, id: EntityId, parent: EntityId) -> Result<CmdResult> {
    project.attach(id, parent)?;
    let mut result = CmdResult::default().with_affected(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "Attached {} under {}",
        describe(project, id),
        describe(project, parent)
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShufflerError;
    use crate::model::Entity;
    use crate::test_utils::sample_project;

    #[test]
    fn test_attach_detached_card() {
        let mut sample = sample_project();
        run(&mut sample.project, sample.loose, sample.act_two).unwrap();
        assert!(sample.project.detached().is_empty());
        assert_eq!(
            sample.project.get_parent(sample.loose).unwrap().id(),
            sample.act_two
        );
    }

    #[test]
    fn test_move_keeps_order_of_remaining_siblings() {
        let mut sample = sample_project();
        run(&mut sample.project, sample.storm, sample.act_two).unwrap();
        let act_one: Vec<_> = sample
            .project
            .section(sample.act_one)
            .unwrap()
            .children
            .iter()
            .map(Entity::id)
            .collect();
        assert_eq!(act_one, vec![sample.calm]);
    }

    #[test]
    fn test_attach_into_own_subtree_fails() {
        let mut sample = sample_project();
        let inner = sample
            .project
            .create_section(sample.act_one, "Inner")
            .unwrap();
        let err = run(&mut sample.project, sample.act_one, inner).unwrap_err();
        assert!(matches!(err, ShufflerError::Cycle { .. }));
        assert!(sample.project.is_attached(sample.act_one));
    }
}
