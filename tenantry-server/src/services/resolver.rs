use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tenantry_core::errors::TenantryError;
use tenantry_core::tenant::{normalize_host, PartitionResolver, RequestTarget, TenantContext, PUBLIC_SCHEMA};

use crate::services::types::partition_key;
use crate::services::TenantryState;

/// Resolves requests through the domain registry.
///
/// 1. The `{domain}` path selector, else the `Host` header, picks the tenant.
/// 2. A `{region_id}` selector then narrows inside that tenant's partition.
///
/// Nothing falls back: an unknown host is "No tenant for hostname." and an
/// unknown region is "Object not found.".
pub struct DomainResolver {
    state: Arc<TenantryState>,
}

impl DomainResolver {
    pub fn new(state: Arc<TenantryState>) -> Self {
        Self { state }
    }

    /// Partition of the tenant owning `host`, if any.
    pub async fn partition_for_host(&self, host: &str) -> Option<String> {
        let host = normalize_host(host);
        let domain = self
            .state
            .domains
            .find_one(PUBLIC_SCHEMA, |d| d.get("domain").and_then(Value::as_str) == Some(host.as_str()))
            .await?;
        let tenant_id = domain.get("tenant_id").and_then(Value::as_i64)?;

        let client = self
            .state
            .clients
            .find_one(PUBLIC_SCHEMA, |c| c.get("id").and_then(Value::as_i64) == Some(tenant_id))
            .await?;
        let schema = client.get("schema_name").and_then(Value::as_str)?;
        Some(partition_key(schema, tenant_id))
    }

    async fn region_exists(&self, partition: &str, region_id: &str) -> bool {
        self.state
            .regions
            .find_one(partition, |r| r.get("region_id").and_then(Value::as_str) == Some(region_id))
            .await
            .is_some()
    }
}

#[async_trait]
impl PartitionResolver for DomainResolver {
    async fn resolve(&self, target: &RequestTarget) -> Result<TenantContext> {
        let unresolved = || TenantryError::unresolved_tenant().into_anyhow();

        let host = target
            .selector("domain")
            .or(target.host.as_deref())
            .ok_or_else(unresolved)?;
        let partition = self.partition_for_host(host).await.ok_or_else(unresolved)?;
        let ctx = TenantContext::new(partition);

        let Some(region_id) = target.selector("region_id") else {
            return Ok(ctx);
        };
        if !self.region_exists(ctx.partition(), region_id).await {
            return Err(TenantryError::object_not_found().into_anyhow());
        }
        Ok(ctx.with_region(region_id))
    }
}
