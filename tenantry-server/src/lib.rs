mod app;
mod config;
mod hooks;
pub mod seed;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tenantry_axum::AxumApp;
use tenantry_core::PartitionResolver;

pub use crate::services::{DomainResolver, TenantryParams, TenantryState};

/// The full server with an empty store; tenants from `TENANTRY_SEED_TENANTS`
/// are created before it returns.
pub async fn build() -> Result<AxumApp<Value, TenantryParams>> {
    build_with_state(Arc::new(TenantryState::default())).await
}

pub async fn build_with_state(state: Arc<TenantryState>) -> Result<AxumApp<Value, TenantryParams>> {
    let ax = app::tenantry_app()?;

    hooks::global_hooks(&ax.app);
    let svcs = services::configure(&ax.app, Arc::clone(&state))?;
    let resolver: Arc<dyn PartitionResolver> = Arc::new(DomainResolver::new(Arc::clone(&state)));

    let ax = ax
        .use_public_service("/clients", svcs.clients)
        .use_public_service("/domains", svcs.domains)
        .with_resolver(resolver)
        .use_service("/members", svcs.members)
        .use_service("/region", svcs.regions)
        .use_service("/items", svcs.items)
        .mount("/client/{domain}/members", "members")
        .mount("/client/{domain}/region", "region")
        .mount("/client/{domain}/items", "items")
        .mount("/{region_id}/members", "members")
        .mount("/client/{domain}/{region_id}/members", "members")
        .use_get("/health", || async { "ok" });

    if let Some(raw) = ax.app.get("tenants.seed") {
        let seeds = seed::parse_seed(&raw)?;
        seed::seed_tenants(&ax.app, &seeds).await?;
    }

    Ok(ax)
}
