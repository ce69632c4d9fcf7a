//! Model access errors.

use thiserror::Error;

use crate::record::DataModelType;

/// Errors returned by [`ModelProxyManager`](crate::ModelProxyManager) accessors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// No record under the requested key, or no records of the kind at all.
    #[error("{kind} entry '{id}' not found")]
    NotFound { kind: DataModelType, id: String },

    /// A single-id query returned more than one record.
    #[error("{kind} entry '{id}' has {count} values")]
    MultipleValues {
        kind: DataModelType,
        id: String,
        count: usize,
    },

    /// The stored record is not of the expected kind.
    #[error("expected {expected} record for '{id}', found {found}")]
    WrongKind {
        expected: DataModelType,
        found: DataModelType,
        id: String,
    },
}

impl ModelError {
    pub fn not_found(kind: DataModelType, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
