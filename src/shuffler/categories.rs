//! Project-level category table.
//!
//! Cards point at categories by integer id. The registry never hands out ids on its own
//! except through [`CategoryRegistry::add`], which uses "max existing + 1". A registry is
//! never empty: constructing one from an empty list yields the default category.

use crate::error::{Result, ShufflerError};
use serde::{Deserialize, Serialize};

pub type CategoryId = u32;

pub const DEFAULT_CATEGORY_NAME: &str = "Default";
pub const DEFAULT_CATEGORY_COLOR: &str = "White";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default = "default_color")]
    pub color_name: String,
}

fn default_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>, color_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color_name: color_name.into(),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::new(0, DEFAULT_CATEGORY_NAME, DEFAULT_CATEGORY_COLOR)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            categories: vec![Category::default()],
        }
    }
}

impl CategoryRegistry {
    /// Builds a registry from a stored list. Later duplicates of an id are dropped.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut registry = Self {
            categories: Vec::with_capacity(categories.len()),
        };
        for category in categories {
            if !registry.contains(category.id) {
                registry.categories.push(category);
            }
        }
        if registry.categories.is_empty() {
            registry.categories.push(Category::default());
        }
        registry
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.get(id).is_some()
    }

    /// Resolves a card's reference. Dangling ids resolve to `None`.
    pub fn resolve(&self, id: Option<CategoryId>) -> Option<&Category> {
        id.and_then(|id| self.get(id))
    }

    pub fn next_id(&self) -> CategoryId {
        self.categories
            .iter()
            .map(|c| c.id)
            .max()
            .map_or(0, |max| max + 1)
    }

    pub fn add(&mut self, name: impl Into<String>, color_name: impl Into<String>) -> CategoryId {
        let id = self.next_id();
        self.categories.push(Category::new(id, name, color_name));
        id
    }

    /// Removes a category. Cards referencing it keep the dangling id.
    pub fn remove(&mut self, id: CategoryId) -> Result<Category> {
        let pos = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(ShufflerError::CategoryNotFound(id))?;
        if self.categories.len() == 1 {
            return Err(ShufflerError::InvalidOperation(
                "a project needs at least one category".to_string(),
            ));
        }
        Ok(self.categories.remove(pos))
    }

    pub fn rename(&mut self, id: CategoryId, name: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_color(&mut self, id: CategoryId, color_name: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.color_name = color_name.into();
        Ok(())
    }

    fn get_mut(&mut self, id: CategoryId) -> Result<&mut Category> {
        self.categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ShufflerError::CategoryNotFound(id))
    }
}
