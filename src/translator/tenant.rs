use serde::{Deserialize, Serialize};

use crate::entity_catalog::naming::same_column;

/// A column that scopes every row to a tenant. Predicates on it are kept
/// while sampling, bound to a fixed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantColumn {
    pub field: String,
    pub sample_value: i64,
}

impl TenantColumn {
    pub fn new(field: impl Into<String>, sample_value: i64) -> Self {
        TenantColumn {
            field: field.into(),
            sample_value,
        }
    }
}

pub fn default_tenant_columns() -> Vec<TenantColumn> {
    vec![
        TenantColumn::new("hospitalId", 59),
        TenantColumn::new("hospitalGroupId", 58),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    columns: Vec<TenantColumn>,
}

impl TenantScope {
    pub fn new(columns: Vec<TenantColumn>) -> Self {
        TenantScope { columns }
    }

    /// Sampling value for `column`, which may be written in camel or snake case.
    pub fn sample_value(&self, column: &str) -> Option<i64> {
        self.columns
            .iter()
            .find(|c| same_column(&c.field, column))
            .map(|c| c.sample_value)
    }
}

impl Default for TenantScope {
    fn default() -> Self {
        TenantScope::new(default_tenant_columns())
    }
}
