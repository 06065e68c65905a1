use crate::categories::CategoryId;
use crate::model::EntityId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShufflerError {
    #[error("Duplicate entity id: {0}")]
    DuplicateId(EntityId),

    #[error("Malformed entity in '{path}': {details}")]
    MalformedEntity { path: PathBuf, details: String },

    #[error("Storage failure at '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Entity {0} is not a section")]
    NotASection(EntityId),

    #[error("Cannot attach {entity} under {parent}: the parent lies inside the entity's own subtree")]
    Cycle { entity: EntityId, parent: EntityId },

    #[error("Entity {0} is still attached to the project tree, detach it first")]
    StillAttached(EntityId),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

impl ShufflerError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ShufflerError::Storage {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, details: impl ToString) -> Self {
        ShufflerError::MalformedEntity {
            path: path.into(),
            details: details.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShufflerError>;
