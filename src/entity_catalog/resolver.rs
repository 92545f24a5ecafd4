use std::collections::HashMap;
use std::sync::Arc;

use crate::java_source::ast::{TypeDeclaration, TypeRef, TypeScope};
use crate::java_source::{JavaSourceError, SourceLocator};

use super::entity::{element_type, EntityDescriptor};
use super::errors::EntityCatalogError;

/// Physical columns of a relationship between two entities.
#[derive(Debug, Clone)]
pub struct ResolvedJoin {
    pub target: Arc<EntityDescriptor>,
    pub local_column: Option<String>,
    pub referenced_column: Option<String>,
}

/// A repository interface together with the entity it manages.
#[derive(Debug, Clone)]
pub struct RepositoryDefinition {
    pub type_name: String,
    pub declaration: TypeDeclaration,
    pub entity: Arc<EntityDescriptor>,
}

/// Loads entity metadata on demand. One resolver serves one translation
/// pass; every entity is parsed at most once within it.
pub struct EntityResolver<'a> {
    locator: &'a dyn SourceLocator,
    entities: HashMap<String, Arc<EntityDescriptor>>,
}

impl<'a> EntityResolver<'a> {
    pub fn new(locator: &'a dyn SourceLocator) -> Self {
        EntityResolver {
            locator,
            entities: HashMap::new(),
        }
    }

    /// Resolves a fully qualified entity type name.
    pub fn resolve(&mut self, qualified_name: &str) -> Result<Arc<EntityDescriptor>, EntityCatalogError> {
        if let Some(entity) = self.entities.get(qualified_name) {
            return Ok(entity.clone());
        }

        let (declaration, scope) = self.load_type(qualified_name)?;
        let entity = Arc::new(EntityDescriptor::new(qualified_name, declaration, scope));
        log::debug!(
            "Resolved entity {} -> table {:?}",
            qualified_name,
            entity.table_name
        );
        self.entities
            .insert(qualified_name.to_string(), entity.clone());
        Ok(entity)
    }

    /// Resolves a type as written inside `scope`, unwrapping collection types.
    pub fn resolve_reference(
        &mut self,
        scope: &TypeScope,
        type_ref: &TypeRef,
    ) -> Result<Arc<EntityDescriptor>, EntityCatalogError> {
        let name = &element_type(type_ref).name;
        let candidates = scope.candidates(name);
        let found = candidates.iter().find(|c| self.locator.exists(c)).cloned();
        match found {
            Some(found) => self.resolve(&found),
            None => Err(EntityCatalogError::MetadataNotFound {
                type_name: name.clone(),
                candidates,
            }),
        }
    }

    /// Join columns for `owner.field`, or `None` when the owner has no such field.
    ///
    /// Missing `@JoinColumn` sides fall back to the target's primary key.
    pub fn resolve_join(
        &mut self,
        owner: &EntityDescriptor,
        field: &str,
    ) -> Result<Option<ResolvedJoin>, EntityCatalogError> {
        let Some(column) = owner.column(field) else {
            return Ok(None);
        };
        let Some(field_type) = owner.field_element_type(field) else {
            return Ok(None);
        };
        let target = self.resolve_reference(owner.scope(), field_type)?;

        let (mut local_column, mut referenced_column) = match &column.join_target {
            Some(join) => (join.local_column.clone(), join.referenced_column.clone()),
            None => (None, None),
        };

        // inverse side: the owning field on the target carries the join column
        let mapped_by = column.join_target.as_ref().and_then(|j| j.mapped_by.as_deref());
        if let (None, None, Some(mapped_by)) = (&local_column, &referenced_column, mapped_by) {
            let back = target.column(mapped_by).and_then(|c| c.join_target);
            let owner_pk = owner.primary_key_column();
            local_column = back
                .as_ref()
                .and_then(|b| b.referenced_column.clone())
                .or_else(|| owner_pk.clone());
            // mirrors the owning side, whose missing local column is our primary key
            referenced_column = back.and_then(|b| b.local_column).or(owner_pk);
        }

        let target_pk = target.primary_key_column();
        if local_column.is_none() {
            local_column = target_pk.clone();
        }
        if referenced_column.is_none() {
            referenced_column = target_pk;
        }

        Ok(Some(ResolvedJoin {
            target,
            local_column,
            referenced_column,
        }))
    }

    /// Loads a repository interface and resolves its managed entity from the
    /// first type argument of its first supertype, which must start with one
    /// of `markers`.
    pub fn resolve_repository(
        &mut self,
        qualified_name: &str,
        markers: &[String],
    ) -> Result<RepositoryDefinition, EntityCatalogError> {
        let (declaration, scope) = self.load_type(qualified_name)?;

        let parent = declaration
            .extends
            .first()
            .filter(|parent| markers.iter().any(|m| parent.simple_name().starts_with(m.as_str())))
            .ok_or_else(|| EntityCatalogError::NotARepository {
                repository: qualified_name.to_string(),
                markers: markers.to_vec(),
            })?;
        let entity_type = parent
            .args
            .first()
            .ok_or_else(|| EntityCatalogError::MissingEntityArgument {
                repository: qualified_name.to_string(),
            })?
            .clone();

        let entity = self.resolve_reference(&scope, &entity_type)?;
        Ok(RepositoryDefinition {
            type_name: qualified_name.to_string(),
            declaration,
            entity,
        })
    }

    fn load_type(&self, qualified_name: &str) -> Result<(TypeDeclaration, TypeScope), EntityCatalogError> {
        let unit = self.locator.load(qualified_name).map_err(|error| match error {
            JavaSourceError::NotFound { path, .. } => EntityCatalogError::MetadataNotFound {
                type_name: qualified_name.to_string(),
                candidates: vec![path],
            },
            error => EntityCatalogError::Source {
                type_name: qualified_name.to_string(),
                error,
            },
        })?;

        let scope = unit.scope();
        let declaration = unit
            .types
            .into_iter()
            .next()
            .ok_or_else(|| EntityCatalogError::EmptyUnit {
                type_name: qualified_name.to_string(),
            })?;
        Ok((declaration, scope))
    }
}
