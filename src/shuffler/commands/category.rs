use crate::categories::CategoryId;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Project;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum CategoryAction {
    List,
    Add { name: String, color: String },
    Remove(CategoryId),
    Rename(CategoryId, String),
    Color(CategoryId, String),
}

impl CategoryAction {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, CategoryAction::List)
    }
}

pub fn run(project: &mut Project, action: CategoryAction) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match action {
        CategoryAction::List => {}
        CategoryAction::Add { name, color } => {
            let id = project.add_category(name.clone(), color);
            result.add_message(CmdMessage::success(format!(
                "Added category {} \"{}\"",
                id, name
            )));
        }
        CategoryAction::Remove(id) => {
            let removed = project.remove_category(id)?;
            result.add_message(CmdMessage::success(format!(
                "Removed category {} \"{}\"",
                removed.id, removed.name
            )));
        }
        CategoryAction::Rename(id, name) => {
            project.rename_category(id, name.clone())?;
            result.add_message(CmdMessage::success(format!(
                "Renamed category {} to \"{}\"",
                id, name
            )));
        }
        CategoryAction::Color(id, color) => {
            project.set_category_color(id, color.clone())?;
            result.add_message(CmdMessage::success(format!(
                "Category {} is now {}",
                id, color
            )));
        }
    }
    Ok(result.with_categories(project.categories().all().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShufflerError;
    use crate::test_utils::sample_project;

    #[test]
    fn test_list_does_not_dirty() {
        let mut sample = sample_project();
        let result = run(&mut sample.project, CategoryAction::List).unwrap();
        assert_eq!(result.categories.len(), 2);
        assert!(!sample.project.has_unsaved_changes());
    }

    #[test]
    fn test_add_uses_next_id() {
        let mut sample = sample_project();
        let result = run(
            &mut sample.project,
            CategoryAction::Add {
                name: "Theme".into(),
                color: "Blue".into(),
            },
        )
        .unwrap();
        let theme = result.categories.last().unwrap();
        assert_eq!(theme.id, sample.plot + 1);
        assert_eq!(theme.color_name, "Blue");
    }

    #[test]
    fn test_rename_color_remove() {
        let mut sample = sample_project();
        let plot = sample.plot;
        run(&mut sample.project, CategoryAction::Rename(plot, "Story".into())).unwrap();
        run(&mut sample.project, CategoryAction::Color(plot, "Green".into())).unwrap();
        let category = sample.project.category_of(sample.storm).unwrap();
        assert_eq!(category.name, "Story");
        assert_eq!(category.color_name, "Green");

        run(&mut sample.project, CategoryAction::Remove(plot)).unwrap();
        assert!(sample.project.category_of(sample.storm).is_none());
        assert!(matches!(
            run(&mut sample.project, CategoryAction::Remove(plot)),
            Err(ShufflerError::CategoryNotFound(_))
        ));
    }
}
