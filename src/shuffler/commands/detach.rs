use crate::commands::{describe, CmdMessage, CmdResult};
use crate::document::Project;
use crate::error::Result;
use crate::model::EntityId;

pub fn run(project: &mut Project, ids: &[EntityId]) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for &id in ids {
        if id == project.root_id() {
            result.add_message(CmdMessage::warning("The root cannot be detached"));
            continue;
        }
        if project.detached().iter().any(|entity| entity.id() == id) {
            result.add_message(CmdMessage::info(format!(
                "{} is already detached",
                describe(project, id)
            )));
            continue;
        }

        project.detach(id)?;
        result.affected.push(id);
        result.add_message(CmdMessage::success(format!(
            "Detached {}",
            describe(project, id)
        )));
    }

    Ok(result)
}
