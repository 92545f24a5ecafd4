use thiserror::Error;

use crate::entity_catalog::EntityCatalogError;
use crate::jpql_parser::errors::QueryParseError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationError {
    #[error("{0}")]
    Parse(#[from] QueryParseError),
    #[error(transparent)]
    Catalog(#[from] EntityCatalogError),
    #[error("Entity `{type_name}` declares no @Table name")]
    MissingTableName { type_name: String },
}

impl TranslationError {
    /// Metadata failures point at a broken source tree and abort the whole
    /// repository; everything else only affects the current query.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TranslationError::Catalog(_))
    }
}
