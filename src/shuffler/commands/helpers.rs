use crate::categories::CategoryId;
use crate::document::Project;
use crate::error::{Result, ShufflerError};
use crate::model::EntityId;

pub const ROOT_SELECTOR: &str = "root";
const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: EntityId) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

/// Resolves `root`, a full uuid, or a unique uuid prefix to an entity id.
pub fn resolve(project: &Project, selector: &str) -> Result<EntityId> {
    let selector = selector.trim();
    if selector.eq_ignore_ascii_case(ROOT_SELECTOR) {
        return Ok(project.root_id());
    }
    if selector.is_empty() {
        return Err(ShufflerError::Api("Empty entity selector".to_string()));
    }

    let needle = selector.to_lowercase();
    let matches: Vec<EntityId> = project
        .all_ids()
        .into_iter()
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(ShufflerError::Api(format!(
            "No entity matches '{}'",
            selector
        ))),
        many => Err(ShufflerError::Api(format!(
            "'{}' is ambiguous: {} entities match",
            selector,
            many.len()
        ))),
    }
}

pub fn resolve_all<I: AsRef<str>>(project: &Project, selectors: &[I]) -> Result<Vec<EntityId>> {
    selectors
        .iter()
        .map(|selector| resolve(project, selector.as_ref()))
        .collect()
}

/// Resolves a category by numeric id or by name (case-insensitive).
pub fn resolve_category(project: &Project, selector: &str) -> Result<CategoryId> {
    let selector = selector.trim();
    if let Ok(id) = selector.parse::<CategoryId>() {
        if project.categories().contains(id) {
            return Ok(id);
        }
        return Err(ShufflerError::CategoryNotFound(id));
    }
    project
        .categories()
        .all()
        .iter()
        .find(|category| category.name.eq_ignore_ascii_case(selector))
        .map(|category| category.id)
        .ok_or_else(|| ShufflerError::Api(format!("No category named '{}'", selector)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_project;

    #[test]
    fn test_resolve_root_full_and_prefix() {
        let sample = sample_project();
        let project = &sample.project;
        assert_eq!(resolve(project, "root").unwrap(), project.root_id());
        assert_eq!(resolve(project, "ROOT").unwrap(), project.root_id());

        let id = sample.storm;
        assert_eq!(resolve(project, &id.to_string()).unwrap(), id);
        assert_eq!(resolve(project, &id.to_string().to_uppercase()).unwrap(), id);
    }

    #[test]
    fn test_resolve_unknown_and_ambiguous() {
        let sample = sample_project();
        assert!(matches!(
            resolve(&sample.project, "zzzz"),
            Err(ShufflerError::Api(_))
        ));
        // Every uuid string starts with a hex digit, so "" would match all; it is rejected outright.
        assert!(resolve(&sample.project, "  ").is_err());
    }

    #[test]
    fn test_resolve_category_by_id_and_name() {
        let sample = sample_project();
        assert_eq!(resolve_category(&sample.project, "0").unwrap(), 0);
        assert_eq!(
            resolve_category(&sample.project, "plot").unwrap(),
            sample.plot
        );
        assert!(matches!(
            resolve_category(&sample.project, "99"),
            Err(ShufflerError::CategoryNotFound(99))
        ));
    }
}
