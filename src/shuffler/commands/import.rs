use crate::commands::{CmdMessage, CmdResult};
use crate::document::Project;
use crate::error::Result;
use crate::parser::parse;

/// One tagged-text document to import.
#[derive(Debug, Clone)]
pub struct ImportSource {
    pub name: String,
    pub text: String,
}

impl ImportSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Parses each source and merges it into the project. Chapters land at the end of the
/// root, cards found before any chapter land in the detached pool.
pub fn run(project: &mut Project, sources: &[ImportSource]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut imported_count = 0;

    for source in sources {
        let parsed = parse(&source.text);
        if parsed.is_empty() {
            result.add_message(CmdMessage::warning(format!(
                "No markers found in {}",
                source.name
            )));
            continue;
        }

        let report = project.merge(parsed)?;
        for warning in &report.warnings {
            result.add_message(CmdMessage::warning(warning.to_string()));
        }
        imported_count += report.total;
        result.affected.extend(report.attached.iter().copied());
        result.affected.extend(report.detached.iter().copied());
        result.add_message(CmdMessage::info(format!(
            "Imported {}: {} entities ({} top-level attached, {} detached)",
            source.name,
            report.total,
            report.attached.len(),
            report.detached.len()
        )));
    }

    result.add_message(CmdMessage::success(format!(
        "Total imported: {}",
        imported_count
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_project;

    const DRAFT: &str = "<!-- card::Prologue -->\nOnce.\n\
                         <!-- chapter 3::Finale -->\n\
                         <!-- section l1::Night -->\n\
                         <!-- card::Stars -->\nSo many.\n";

    #[test]
    fn test_import_merges_into_live_root() {
        let mut sample = sample_project();
        let root = sample.project.root_id();
        let result = run(&mut sample.project, &[ImportSource::new("draft.md", DRAFT)]).unwrap();

        assert_eq!(sample.project.root_id(), root);
        let top: Vec<_> = sample
            .project
            .root()
            .children
            .iter()
            .map(|c| c.meta().summary.clone())
            .collect();
        assert_eq!(top, vec!["Act One", "Act Two", "[3] Finale"]);
        assert_eq!(sample.project.detached().len(), 2);
        assert_eq!(result.affected.len(), 2);
        assert!(result
            .messages
            .last()
            .unwrap()
            .content
            .ends_with("Total imported: 4"));
        assert!(sample.project.has_unsaved_changes());
    }

    #[test]
    fn test_import_without_markers_warns() {
        let mut sample = sample_project();
        let result = run(
            &mut sample.project,
            &[ImportSource::new("notes.txt", "just prose\n")],
        )
        .unwrap();
        assert!(result.affected.is_empty());
        assert!(!sample.project.has_unsaved_changes());
        assert!(result.messages[0].content.contains("notes.txt"));
    }
}
