use crate::commands::{describe, CmdMessage, CmdResult};
use crate::config::ShufflerConfig;
use crate::document::Project;
use crate::error::Result;
use crate::model::{EntityId, EntityKind};

/// Creates a card or section as the last child of `parent`.
/// A missing summary falls back to the configured default for the kind.
pub fn run(
    project: &mut Project,
    config: &ShufflerConfig,
    parent: EntityId,
    kind: EntityKind,
    summary: Option<String>,
    content: Option<String>,
) -> Result<CmdResult> {
    let id = match kind {
        EntityKind::Card => project.create_card(
            parent,
            summary.unwrap_or_else(|| config.card_summary.clone()),
            content.unwrap_or_default(),
        )?,
        EntityKind::Section => project.create_section(
            parent,
            summary.unwrap_or_else(|| config.section_summary.clone()),
        )?,
    };

    let mut result = CmdResult::default().with_affected(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "Added {} {} under {}",
        kind,
        describe(project, id),
        describe(project, parent)
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShufflerError;
    use crate::test_utils::sample_project;

    #[test]
    fn test_add_card_with_defaults() {
        let mut sample = sample_project();
        let config = ShufflerConfig::default();
        let result = run(
            &mut sample.project,
            &config,
            sample.act_two,
            EntityKind::Card,
            None,
            None,
        )
        .unwrap();
        let id = result.affected[0];
        let card = sample.project.card(id).unwrap();
        assert_eq!(card.meta.summary, "Enter Card Summary");
        assert!(card.content.is_empty());
        assert_eq!(sample.project.get_parent(id).unwrap().id(), sample.act_two);
    }

    #[test]
    fn test_add_section_into_detached_tree() {
        let mut sample = sample_project();
        sample.project.detach(sample.act_one).unwrap();
        let result = run(
            &mut sample.project,
            &ShufflerConfig::default(),
            sample.act_one,
            EntityKind::Section,
            Some("Interlude".into()),
            None,
        )
        .unwrap();
        let id = result.affected[0];
        assert!(!sample.project.is_attached(id));
        assert_eq!(sample.project.meta(id).unwrap().summary, "Interlude");
    }

    #[test]
    fn test_add_under_card_fails() {
        let mut sample = sample_project();
        let err = run(
            &mut sample.project,
            &ShufflerConfig::default(),
            sample.storm,
            EntityKind::Card,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ShufflerError::NotASection(_)));
    }
}
