use thiserror::Error;

use crate::java_source::JavaSourceError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EntityCatalogError {
    #[error("No source definition found for `{type_name}` (tried {})", .candidates.join(", "))]
    MetadataNotFound {
        type_name: String,
        candidates: Vec<String>,
    },
    #[error("Failed to read definition of `{type_name}`: {error}")]
    Source {
        type_name: String,
        error: JavaSourceError,
    },
    #[error("`{type_name}` declares no type")]
    EmptyUnit { type_name: String },
    #[error("`{repository}` does not extend any of {}", .markers.join(", "))]
    NotARepository {
        repository: String,
        markers: Vec<String>,
    },
    #[error("`{repository}` declares no managed entity type argument")]
    MissingEntityArgument { repository: String },
}
