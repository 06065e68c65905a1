use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::loader::LoadWarning;

/// Reports the problems found while loading. `rewritten` tells whether the caller saved
/// the loaded project back, which replaces the inconsistent files with a clean set.
pub fn run(warnings: &[LoadWarning], rewritten: bool) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if warnings.is_empty() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return Ok(result);
    }

    result.add_message(CmdMessage::warning(format!(
        "{} inconsistencies found:",
        warnings.len()
    )));
    for warning in warnings {
        result.add_message(CmdMessage::info(format!("  - {}", warning)));
    }
    if rewritten {
        result.add_message(CmdMessage::success(
            "Project rewritten from the loaded state.",
        ));
    } else {
        result.add_message(CmdMessage::info(
            "Run with --fix to rewrite the project from the loaded state.",
        ));
    }
    Ok(result)
}
