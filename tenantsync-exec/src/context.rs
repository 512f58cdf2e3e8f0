use std::sync::Arc;

use serde::Serialize;
use tenantsync_store::{SessionScope, TenantId};

pub const USER_GROUP_SCHOOL_ADMIN: &str = "USER_GROUP_SCHOOL_ADMIN";

/// Identity a job acts under inside one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantClaims {
    pub resource_path: String,
    pub user_group: String,
    pub user_id: String,
}

/// Tenant-scoped context handed to every executor call for that tenant.
/// Built once per tenant; clones share the claims.
#[derive(Debug, Clone)]
pub struct TenantContext {
    tenant: TenantId,
    claims: Arc<TenantClaims>,
}

impl TenantContext {
    pub fn new(tenant: TenantId, claims: TenantClaims) -> Self {
        Self {
            tenant,
            claims: Arc::new(claims),
        }
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn claims(&self) -> &TenantClaims {
        &self.claims
    }

    pub fn session_scope(&self) -> SessionScope<'_> {
        SessionScope {
            resource_path: &self.claims.resource_path,
            user_group: &self.claims.user_group,
        }
    }
}

/// Injects tenant identity into the context. The engine threads the result
/// through without interpreting the claims.
pub trait ContextBuilder: Send + Sync {
    fn build(&self, tenant: &TenantId) -> TenantContext;
}

/// Issues school-admin claims for the tenant's resource path.
#[derive(Debug, Clone)]
pub struct AdminContextBuilder {
    user_id: String,
}

impl AdminContextBuilder {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Default for AdminContextBuilder {
    fn default() -> Self {
        Self::new("tenantsync")
    }
}

impl ContextBuilder for AdminContextBuilder {
    fn build(&self, tenant: &TenantId) -> TenantContext {
        TenantContext::new(
            tenant.clone(),
            TenantClaims {
                resource_path: tenant.as_str().to_string(),
                user_group: USER_GROUP_SCHOOL_ADMIN.to_string(),
                user_id: self.user_id.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_builder_scopes_claims_to_tenant() {
        let ctx = AdminContextBuilder::new("batch-user").build(&TenantId::new("-2147483642"));
        assert_eq!(ctx.tenant().as_str(), "-2147483642");
        assert_eq!(ctx.claims().resource_path, "-2147483642");
        assert_eq!(ctx.claims().user_group, USER_GROUP_SCHOOL_ADMIN);
        assert_eq!(ctx.claims().user_id, "batch-user");

        let scope = ctx.session_scope();
        assert_eq!(scope.resource_path, "-2147483642");
        assert_eq!(scope.user_group, USER_GROUP_SCHOOL_ADMIN);
    }
}
