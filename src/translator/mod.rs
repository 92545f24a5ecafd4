//! Query translation pipeline: entity name substitution, cleanup, parsing,
//! clause rewriting, join resolution, rendering and dialect normalization.

use std::sync::Arc;

use regex::{NoExpand, Regex};

use crate::entity_catalog::{EntityDescriptor, EntityResolver};
use crate::java_source::SourceLocator;
use crate::jpql_parser::{clean_up, parse_query};
use crate::sql_generator::{Dialect, ToSql};

pub mod errors;
pub mod join_resolver;
pub mod rewriter;
pub mod tenant;

pub use errors::TranslationError;
pub use join_resolver::JoinResolver;
pub use rewriter::ExpressionRewriter;
pub use tenant::{default_tenant_columns, TenantColumn, TenantScope};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedQuery {
    /// Rendered SQL, parameter markers as written.
    pub sql_text: String,
    /// `sql_text` normalized for execution: bare `?` markers and dialect fixes.
    pub executable_sql: String,
    pub placeholder_count: usize,
    /// Left-hand sides of the WHERE predicates that were neutralized.
    pub discarded: Vec<String>,
    pub unresolved_joins: usize,
}

/// Replaces whole-word occurrences of an entity's simple name with its table.
pub fn substitute_entity_name(query: &str, entity: &str, table: &str) -> String {
    let pattern = format!(r"\b{}\b", regex::escape(entity));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(query, NoExpand(table)).into_owned(),
        Err(_) => query.replace(entity, table),
    }
}

/// Translates the queries of one repository. Entity metadata is cached for
/// the lifetime of the translator.
pub struct Translator<'a> {
    resolver: EntityResolver<'a>,
    tenants: TenantScope,
    dialect: Dialect,
}

impl<'a> Translator<'a> {
    pub fn new(locator: &'a dyn SourceLocator, tenants: TenantScope, dialect: Dialect) -> Self {
        Translator {
            resolver: EntityResolver::new(locator),
            tenants,
            dialect,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn resolver(&mut self) -> &mut EntityResolver<'a> {
        &mut self.resolver
    }

    pub fn translate(
        &mut self,
        query: &str,
        root: &Arc<EntityDescriptor>,
    ) -> Result<TranslatedQuery, TranslationError> {
        let table_name =
            root.table_name
                .as_deref()
                .ok_or_else(|| TranslationError::MissingTableName {
                    type_name: root.type_name.clone(),
                })?;

        let substituted = substitute_entity_name(query, root.simple_name(), table_name);
        let cleaned = clean_up(&substituted);
        log::debug!("Parsing {}", cleaned);
        let statement = parse_query(&cleaned)?;

        let mut joins = JoinResolver::new(
            &mut self.resolver,
            ExpressionRewriter::new(&self.tenants),
            self.dialect,
        );
        let statement = joins.convert_statement(statement, root)?;
        let unresolved_joins = joins.unresolved_joins();
        let discarded = joins
            .into_rewriter()
            .into_discarded()
            .iter()
            .map(ToSql::to_sql)
            .collect();

        let sql_text = statement.to_sql();
        let normalized = self.dialect.normalize(&sql_text);
        Ok(TranslatedQuery {
            sql_text,
            executable_sql: normalized.sql,
            placeholder_count: normalized.placeholder_count,
            discarded,
            unresolved_joins,
        })
    }
}
