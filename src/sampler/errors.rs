use thiserror::Error;

use crate::entity_catalog::EntityCatalogError;
use crate::sql_generator::Dialect;
use crate::translator::TranslationError;

#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("Invalid database url `{url}`: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Schema switch to `{schema}` failed: {message}")]
    SchemaSwitch { schema: String, message: String },
    #[error("{0}")]
    Execution(String),
    #[error("No sampling driver for the {0} dialect")]
    UnsupportedDialect(Dialect),
    #[error(transparent)]
    Catalog(#[from] EntityCatalogError),
    #[error(transparent)]
    Translation(#[from] TranslationError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
