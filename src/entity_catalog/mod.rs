//! Entity metadata: table names, column names and relationship columns mined
//! from JPA entity sources.

pub mod entity;
pub mod errors;
pub mod naming;
pub mod resolver;

pub use entity::{ColumnDescriptor, EntityDescriptor, JoinTarget};
pub use errors::EntityCatalogError;
pub use naming::camel_to_snake;
pub use resolver::{EntityResolver, RepositoryDefinition, ResolvedJoin};
