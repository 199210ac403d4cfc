use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tenantry_core::tenant::TenantContext;
use tenantry_core::{ServiceCapabilities, TenantryService};

use crate::services::adapters::{PartitionAdapter, UniqueKey};
use crate::services::types::partition_key;
use crate::services::{TableKind, TenantryParams, TenantryState};

use super::clients_shared;

const UNIQUE: &[UniqueKey] = &[UniqueKey {
    fields: &["schema_name"],
    only_if: None,
    message: "schema_name already exists",
}];

/// The tenant registry, kept in the public partition.
pub struct ClientsService {
    pub adapter: PartitionAdapter,
    pub state: Arc<TenantryState>,
}

impl ClientsService {
    pub fn new(state: Arc<TenantryState>) -> Self {
        Self {
            adapter: PartitionAdapter::new(
                Arc::clone(&state),
                TableKind::Clients,
                clients_shared::registry_capabilities(),
            )
            .search(&["name", "schema_name"])
            .unique(UNIQUE)
            .created_at("created_on"),
            state,
        }
    }
}

#[async_trait]
impl TenantryService<Value, TenantryParams> for ClientsService {
    fn capabilities(&self) -> ServiceCapabilities {
        clients_shared::registry_capabilities()
    }

    async fn find(&self, ctx: &TenantContext, params: TenantryParams) -> Result<Vec<Value>> {
        self.adapter._find(ctx, params).await
    }

    async fn get(&self, ctx: &TenantContext, id: &str, params: TenantryParams) -> Result<Value> {
        self.adapter._get(ctx, id, params).await
    }

    async fn create(&self, ctx: &TenantContext, data: Value, params: TenantryParams) -> Result<Value> {
        let client = self.adapter._create(ctx, data, params).await?;

        let schema = client.get("schema_name").and_then(Value::as_str).unwrap_or("-");
        if let Some(id) = client.get("id").and_then(Value::as_i64) {
            self.state.open_partition(&partition_key(schema, id));
        }
        tracing::info!(schema, "tenant created");
        Ok(client)
    }

    /// Removing a tenant also drops its partition and its domains.
    async fn remove(&self, ctx: &TenantContext, id: &str, params: TenantryParams) -> Result<Value> {
        let removed = self.adapter._remove(ctx, id, params).await?;

        let Some(tenant_id) = removed.get("id").and_then(Value::as_i64) else {
            return Ok(removed);
        };
        self.state
            .domains
            .delete_where(ctx.partition(), |d| {
                d.get("tenant_id").and_then(Value::as_i64) == Some(tenant_id)
            })
            .await;
        if let Some(schema) = removed.get("schema_name").and_then(Value::as_str) {
            self.state
                .drop_tenant_partition(&partition_key(schema, tenant_id))
                .await;
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;
    use tenantry_core::errors::TenantryError;
    use tenantry_core::{PartitionResolver, RequestTarget};

    use super::*;
    use crate::services::{self, DomainResolver, ServerApp};

    async fn register(app: &ServerApp, host: &str) -> i64 {
        let client = app
            .service("clients")
            .unwrap()
            .create(
                TenantContext::public(),
                json!({"name": "Acme", "schema_name": "acme"}),
                TenantryParams::default(),
            )
            .await
            .unwrap();
        let id = client["id"].as_i64().unwrap();
        app.service("domains")
            .unwrap()
            .create(
                TenantContext::public(),
                json!({"domain": host, "tenant_id": id, "is_primary": true}),
                TenantryParams::default(),
            )
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn writes_resolved_before_a_delete_never_reach_a_new_tenant() {
        let app = ServerApp::new();
        let state = Arc::new(TenantryState::default());
        services::configure(&app, Arc::clone(&state)).unwrap();
        let resolver = DomainResolver::new(Arc::clone(&state));
        let target = RequestTarget::new(Some("acme.localhost"), HashMap::new());
        let items = app.service("items").unwrap();

        let id = register(&app, "acme.localhost").await;
        let stale = resolver.resolve(&target).await.unwrap();
        items
            .create(stale.clone(), json!({"name": "old"}), TenantryParams::default())
            .await
            .unwrap();

        app.service("clients")
            .unwrap()
            .remove(TenantContext::public(), &id.to_string(), TenantryParams::default())
            .await
            .unwrap();

        let err = items
            .create(stale.clone(), json!({"name": "late"}), TenantryParams::default())
            .await
            .unwrap_err();
        assert!(TenantryError::is_not_found(&err));

        register(&app, "acme.localhost").await;
        let fresh = resolver.resolve(&target).await.unwrap();
        assert_ne!(fresh.partition(), stale.partition());

        assert!(items
            .create(stale, json!({"name": "later"}), TenantryParams::default())
            .await
            .is_err());
        let rows = items.find(fresh, TenantryParams::default()).await.unwrap();
        assert!(rows.is_empty(), "{rows:?}");
    }
}
