use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tenantry_core::errors::TenantryError;
use tenantry_core::tenant::TenantContext;
use tenantry_core::{ServiceCapabilities, TenantryService};

use crate::services::adapters::{PartitionAdapter, UniqueKey};
use crate::services::{TableKind, TenantryParams, TenantryState};

use super::domains_shared;

const UNIQUE: &[UniqueKey] = &[
    UniqueKey {
        fields: &["domain"],
        only_if: None,
        message: "domain already exists",
    },
    UniqueKey {
        fields: &["tenant_id"],
        only_if: Some("is_primary"),
        message: "tenant already has a primary domain",
    },
];

/// Hostname → tenant mappings, kept in the public partition.
pub struct DomainsService {
    pub adapter: PartitionAdapter,
}

impl DomainsService {
    pub fn new(state: Arc<TenantryState>) -> Self {
        Self {
            adapter: PartitionAdapter::new(state, TableKind::Domains, domains_shared::registry_capabilities())
                .search(&["domain"])
                .unique(UNIQUE),
        }
    }
}

/// `?is_primary=` accepts true/false (also 1/0, yes/no).
fn primary_filter(params: &TenantryParams) -> Result<Option<bool>> {
    match params.query_str("is_primary") {
        None => Ok(None),
        Some(_) => params.query_bool("is_primary").map(Some).ok_or_else(|| {
            TenantryError::bad_request("Invalid is_primary filter")
                .with_errors(json!({"is_primary": ["must be true or false"]}))
                .into_anyhow()
        }),
    }
}

#[async_trait]
impl TenantryService<Value, TenantryParams> for DomainsService {
    fn capabilities(&self) -> ServiceCapabilities {
        domains_shared::registry_capabilities()
    }

    async fn find(&self, ctx: &TenantContext, params: TenantryParams) -> Result<Vec<Value>> {
        let primary = primary_filter(&params)?;
        let all = self.adapter._find(ctx, params).await?;
        Ok(all
            .into_iter()
            .filter(|d| primary.is_none_or(|p| d.get("is_primary").and_then(Value::as_bool) == Some(p)))
            .collect())
    }

    async fn get(&self, ctx: &TenantContext, id: &str, params: TenantryParams) -> Result<Value> {
        self.adapter._get(ctx, id, params).await
    }

    async fn create(&self, ctx: &TenantContext, data: Value, params: TenantryParams) -> Result<Value> {
        self.adapter._create(ctx, data, params).await
    }

    async fn remove(&self, ctx: &TenantContext, id: &str, params: TenantryParams) -> Result<Value> {
        self.adapter._remove(ctx, id, params).await
    }
}
