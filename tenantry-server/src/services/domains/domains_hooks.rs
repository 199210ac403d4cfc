use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tenantry_core::errors::TenantryError;
use tenantry_core::hooks::{BeforeHook, HookContext};
use tenantry_core::tenant::normalize_host;

use crate::services::clients::clients_shared;
use crate::services::TenantryParams;

use super::domains_shared::SCHEMA_ERROR;

/// Store hostnames the way requests are matched: lowercase, no port.
pub struct NormalizeDomainHost;

#[async_trait]
impl BeforeHook<Value, TenantryParams> for NormalizeDomainHost {
    async fn run(&self, ctx: &mut HookContext<Value, TenantryParams>) -> Result<()> {
        let Some(obj) = ctx.data.as_mut().and_then(Value::as_object_mut) else {
            return Ok(());
        };

        if let Some(host) = obj.get("domain").and_then(Value::as_str).map(normalize_host) {
            obj.insert("domain".to_string(), Value::String(host));
        }
        Ok(())
    }
}

/// `tenant_id` must name an existing client.
pub struct ValidateDomainTenant;

#[async_trait]
impl BeforeHook<Value, TenantryParams> for ValidateDomainTenant {
    async fn run(&self, ctx: &mut HookContext<Value, TenantryParams>) -> Result<()> {
        let Some(tenant_id) = ctx
            .data
            .as_ref()
            .and_then(|d| d.get("tenant_id"))
            .and_then(Value::as_i64)
        else {
            return Ok(());
        };

        let clients = ctx.services.service(clients_shared::SERVICE)?;
        let mut params = ctx.params.clone();
        params.query.clear();

        match clients.get(&ctx.tenant, &tenant_id.to_string(), params).await {
            Ok(_) => Ok(()),
            Err(e) if TenantryError::is_not_found(&e) => Err(tenantry_schema::unprocessable(
                SCHEMA_ERROR,
                json!({"tenant_id": ["tenant not found"]}),
            )),
            Err(e) => Err(e),
        }
    }
}
