use crate::commands::{helpers::short_id, CmdMessage, CmdResult};
use crate::document::Project;
use crate::error::Result;
use crate::model::EntityId;

/// Permanently removes detached entities. Attached ones must be detached first.
pub fn run(project: &mut Project, ids: &[EntityId]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for &id in ids {
        let removed = project.delete_detached(id)?;
        let count = removed.ids().len();
        result.affected.push(id);
        let suffix = if count > 1 {
            format!(" and {} nested entities", count - 1)
        } else {
            String::new()
        };
        result.add_message(CmdMessage::success(format!(
            "Deleted {} \"{}\"{}",
            short_id(id),
            removed.meta().summary,
            suffix
        )));
    }
    Ok(result)
}
