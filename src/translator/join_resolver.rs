//! Turns relationship joins (`join d.dischargeNurseRequest n`) into physical
//! table joins with explicit equality conditions.

use std::sync::Arc;

use crate::entity_catalog::{EntityCatalogError, EntityDescriptor, EntityResolver};
use crate::jpql_parser::ast::{ComparisonOperator, Expression, FromItem, Join, SelectStatement};
use crate::sql_generator::Dialect;

use super::rewriter::ExpressionRewriter;

/// Converts a parsed statement: clause rewriting first, then join
/// reconstruction. Sub-selects used as join items go through the same steps.
pub struct JoinResolver<'r, 'a, 't> {
    resolver: &'r mut EntityResolver<'a>,
    rewriter: ExpressionRewriter<'t>,
    dialect: Dialect,
    unresolved: usize,
}

impl<'r, 'a, 't> JoinResolver<'r, 'a, 't> {
    pub fn new(
        resolver: &'r mut EntityResolver<'a>,
        rewriter: ExpressionRewriter<'t>,
        dialect: Dialect,
    ) -> Self {
        JoinResolver {
            resolver,
            rewriter,
            dialect,
            unresolved: 0,
        }
    }

    /// Relationship joins that matched no known entity field.
    pub fn unresolved_joins(&self) -> usize {
        self.unresolved
    }

    pub fn into_rewriter(self) -> ExpressionRewriter<'t> {
        self.rewriter
    }

    pub fn convert_statement(
        &mut self,
        statement: SelectStatement,
        root: &Arc<EntityDescriptor>,
    ) -> Result<SelectStatement, EntityCatalogError> {
        let mut statement = self.rewriter.rewrite_clauses(statement);
        let joins = std::mem::take(&mut statement.joins);
        statement.joins = self.resolve_joins(joins, root)?;
        Ok(statement)
    }

    /// Resolves joins in declaration order. Each resolved target becomes
    /// visible to the joins after it, so chains like
    /// `join d.ward w join w.building b` work.
    pub fn resolve_joins(
        &mut self,
        joins: Vec<Join>,
        root: &Arc<EntityDescriptor>,
    ) -> Result<Vec<Join>, EntityCatalogError> {
        let mut seen: Vec<Arc<EntityDescriptor>> = vec![root.clone()];
        joins
            .into_iter()
            .map(|join| self.resolve_join(join, root, &mut seen))
            .collect()
    }

    fn resolve_join(
        &mut self,
        mut join: Join,
        root: &Arc<EntityDescriptor>,
        seen: &mut Vec<Arc<EntityDescriptor>>,
    ) -> Result<Join, EntityCatalogError> {
        let (qualifier, field, alias) = match join.item {
            FromItem::SubSelect { query, alias } => {
                let query = self.convert_statement(*query, root)?;
                join.item = FromItem::SubSelect {
                    query: Box::new(query),
                    alias,
                };
                join.on = self.rewrite_conditions(join.on);
                return Ok(join);
            }
            FromItem::Table { ref path, ref alias } if path.len() == 2 => {
                (path[0].clone(), path[1].clone(), alias.clone())
            }
            // already a table, e.g. in a native query
            FromItem::Table { .. } => return Ok(join),
        };

        let mut found = None;
        for owner in seen.iter() {
            if let Some(resolved) = self.resolver.resolve_join(owner, &field)? {
                found = Some(resolved);
                break;
            }
        }

        let Some(resolved) = found else {
            log::warn!("Unresolved join {}.{}: no known entity has that field", qualifier, field);
            self.unresolved += 1;
            return Ok(join);
        };
        let Some(table_name) = resolved.target.table_name.as_deref() else {
            log::warn!(
                "Unresolved join {}.{}: {} declares no table",
                qualifier,
                field,
                resolved.target.type_name
            );
            self.unresolved += 1;
            return Ok(join);
        };

        let table_name = self.dialect.physical_name(table_name);
        let target_qualifier = alias.clone().unwrap_or_else(|| table_name.clone());

        join.on = self.rewrite_conditions(join.on);
        if let (Some(local), Some(referenced)) =
            (&resolved.local_column, &resolved.referenced_column)
        {
            join.on.push(Expression::comparison(
                ComparisonOperator::Equal,
                Expression::column(Some(&qualifier), &self.dialect.physical_name(local)),
                Expression::column(
                    Some(&target_qualifier),
                    &self.dialect.physical_name(referenced),
                ),
            ));
        }
        join.item = FromItem::Table {
            path: vec![table_name],
            alias,
        };

        log::debug!(
            "Join {}.{} resolved to {}",
            qualifier,
            field,
            resolved.target.type_name
        );
        if !seen.iter().any(|e| e.type_name == resolved.target.type_name) {
            seen.push(resolved.target);
        }
        Ok(join)
    }

    fn rewrite_conditions(&mut self, conditions: Vec<Expression>) -> Vec<Expression> {
        conditions
            .into_iter()
            .map(|condition| self.rewriter.rewrite(condition, false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java_source::FileSourceLocator;
    use crate::jpql_parser::parse_query;
    use crate::sql_generator::ToSql;
    use crate::translator::tenant::TenantScope;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, src: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, src).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "com/acme/entity/Detail.java",
            r#"package com.acme.entity;
            @Entity @Table(name = "discharge_detail") public class Detail {
                @Id private Long id;
                @ManyToOne @JoinColumn(name = "nurse_request_id", referencedColumnName = "id")
                private NurseRequest dischargeNurseRequest;
                @ManyToOne private Ward ward;
                @ManyToOne private Building building;
            }"#,
        );
        write(
            dir.path(),
            "com/acme/entity/NurseRequest.java",
            r#"package com.acme.entity;
            @Entity @Table(name = "\"NurseRequest\"") public class NurseRequest {
                @Id private Long id;
                @ManyToOne @JoinColumn(name = "ward_id") private Ward requestWard;
            }"#,
        );
        write(
            dir.path(),
            "com/acme/entity/Ward.java",
            r#"package com.acme.entity;
            @Entity @Table(name = "ward") public class Ward {
                @Id private Long wardId;
                @ManyToOne private Ward parent;
            }"#,
        );
        write(
            dir.path(),
            "com/acme/entity/Shift.java",
            r#"package com.acme.entity;
            @Entity @Table(name = "shift") public class Shift {
                @Id private Long shiftId;
                @ManyToOne @JoinColumn(name = "nurse_id") private Nurse nurse;
            }"#,
        );
        write(
            dir.path(),
            "com/acme/entity/Nurse.java",
            r#"package com.acme.entity;
            @Entity @Table(name = "nurse") public class Nurse {
                @Id private Long nurseId;
                @ManyToOne @JoinColumn(name = "current_shift_id") private Shift currentShift;
            }"#,
        );
        write(
            dir.path(),
            "com/acme/entity/Building.java",
            r#"package com.acme.entity;
            @Entity public class Building { @Id private Long id; }"#,
        );
        dir
    }

    fn convert(query: &str, dialect: Dialect) -> (String, usize) {
        convert_from("com.acme.entity.Detail", query, dialect)
    }

    fn convert_from(root_type: &str, query: &str, dialect: Dialect) -> (String, usize) {
        let dir = fixture();
        let locator = FileSourceLocator::new(dir.path());
        let mut resolver = EntityResolver::new(&locator);
        let root = resolver.resolve(root_type).unwrap();
        let tenants = TenantScope::default();

        let mut joins = JoinResolver::new(&mut resolver, ExpressionRewriter::new(&tenants), dialect);
        let statement = joins
            .convert_statement(parse_query(query).unwrap(), &root)
            .unwrap();
        (statement.to_sql(), joins.unresolved_joins())
    }

    #[test]
    fn test_relationship_join_gets_table_and_condition() {
        let (sql, unresolved) = convert(
            "select d from discharge_detail d join d.dischargeNurseRequest n where n.status = 1",
            Dialect::Generic,
        );
        assert_eq!(
            sql,
            "SELECT * FROM discharge_detail d JOIN \"NurseRequest\" n ON d.nurse_request_id = n.id WHERE n.status = 1"
        );
        assert_eq!(unresolved, 0);
    }

    #[test]
    fn test_chained_join_under_oracle() {
        let (sql, _) = convert(
            "select d from discharge_detail d left join d.dischargeNurseRequest n \
             left join n.requestWard w with w.isOpen = true",
            Dialect::Oracle,
        );
        assert_eq!(
            sql,
            "SELECT * FROM discharge_detail d LEFT JOIN NurseRequest n ON d.nurse_request_id = n.id \
             LEFT JOIN ward w ON w.is_open = TRUE AND n.ward_id = w.ward_id"
        );
    }

    #[test]
    fn test_unknown_field_and_missing_table_are_unresolved() {
        let (sql, unresolved) = convert(
            "select d from discharge_detail d join d.nothing x join d.building b",
            Dialect::Generic,
        );
        assert_eq!(
            sql,
            "SELECT * FROM discharge_detail d JOIN d.nothing x JOIN d.building b"
        );
        assert_eq!(unresolved, 2);
    }

    #[test]
    fn test_plain_table_join_untouched() {
        let (sql, unresolved) = convert(
            "select * from discharge_detail d join ward w on w.ward_id = d.ward_id",
            Dialect::Generic,
        );
        assert_eq!(
            sql,
            "SELECT * FROM discharge_detail d JOIN ward w ON w.ward_id = d.ward_id"
        );
        assert_eq!(unresolved, 0);
    }

    #[test]
    fn test_sub_select_join_is_converted() {
        let (sql, _) = convert(
            "select d from discharge_detail d join (select x.detailId from note x where x.noteType = ?1) y on y.detailId = d.id",
            Dialect::Generic,
        );
        assert_eq!(
            sql,
            "SELECT * FROM discharge_detail d JOIN (SELECT x.detail_id FROM note x WHERE '1' = '1') y ON y.detail_id = d.id"
        );
    }

    #[test]
    fn test_self_referencing_chain_terminates() {
        let (sql, unresolved) = convert_from(
            "com.acme.entity.Ward",
            "select w from ward w join w.parent p join p.parent pp",
            Dialect::Generic,
        );
        assert_eq!(
            sql,
            "SELECT * FROM ward w JOIN ward p ON w.ward_id = p.ward_id JOIN ward pp ON p.ward_id = pp.ward_id"
        );
        assert_eq!(unresolved, 0);
    }

    #[test]
    fn test_mutually_referencing_chain_terminates() {
        let (sql, unresolved) = convert_from(
            "com.acme.entity.Shift",
            "select s from shift s join s.nurse n join n.currentShift c join c.nurse n2",
            Dialect::Generic,
        );
        assert_eq!(
            sql,
            "SELECT * FROM shift s JOIN nurse n ON s.nurse_id = n.nurse_id \
             JOIN shift c ON n.current_shift_id = c.shift_id \
             JOIN nurse n2 ON c.nurse_id = n2.nurse_id"
        );
        assert_eq!(unresolved, 0);
    }
}
