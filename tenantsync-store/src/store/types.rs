use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Opaque tenant identifier (organization id / resource path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Control table that lists tenants. Identifiers are checked before they are
/// spliced into SQL, since they cannot be bound as parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantTable {
    schema: Option<String>,
    table: String,
    column: String,
}

impl Default for TenantTable {
    fn default() -> Self {
        Self {
            schema: None,
            table: "organizations".to_string(),
            column: "organization_id".to_string(),
        }
    }
}

impl TenantTable {
    /// `table` may be schema-qualified (`public.organizations`).
    pub fn new(table: &str, column: &str) -> Result<Self, StoreError> {
        let (schema, table) = match table.split_once('.') {
            Some((schema, table)) => (Some(check_ident(schema)?), check_ident(table)?),
            None => (None, check_ident(table)?),
        };
        Ok(Self {
            schema,
            table,
            column: check_ident(column)?,
        })
    }

    pub fn select_sql(&self) -> String {
        let table = match &self.schema {
            Some(schema) => format!("\"{schema}\".\"{}\"", self.table),
            None => format!("\"{}\"", self.table),
        };
        format!(
            "SELECT \"{col}\"::text FROM {table} ORDER BY \"{col}\"",
            col = self.column
        )
    }
}

fn check_ident(s: &str) -> Result<String, StoreError> {
    if IDENT_RE.is_match(s) {
        Ok(s.to_string())
    } else {
        Err(StoreError::InvalidIdentifier(s.to_string()))
    }
}

/// Session settings that scope a transaction to one tenant, read by
/// row-level security policies.
#[derive(Debug, Clone, Copy)]
pub struct SessionScope<'a> {
    pub resource_path: &'a str,
    pub user_group: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_selects_organizations() {
        assert_eq!(
            TenantTable::default().select_sql(),
            r#"SELECT "organization_id"::text FROM "organizations" ORDER BY "organization_id""#
        );
    }

    #[test]
    fn schema_qualified_table() {
        let t = TenantTable::new("tenancy.tenants", "tenant_id").unwrap();
        assert_eq!(
            t.select_sql(),
            r#"SELECT "tenant_id"::text FROM "tenancy"."tenants" ORDER BY "tenant_id""#
        );
    }

    #[test]
    fn rejects_injection_in_identifiers() {
        assert!(matches!(
            TenantTable::new("orgs; DROP TABLE x", "id"),
            Err(StoreError::InvalidIdentifier(_))
        ));
        assert!(TenantTable::new("orgs", "id\"--").is_err());
        assert!(TenantTable::new("a.b.c", "id").is_err());
    }
}
