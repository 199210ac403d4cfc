//! Startup tenants from `TENANTRY_SEED_TENANTS`.
//!
//! Format: `schema:Display Name:host1|host2,schema2:Other:host3`. The first
//! host of each tenant becomes its primary domain.

use anyhow::{anyhow, bail, Result};
use serde_json::{json, Value};
use tenantry_core::TenantContext;

use crate::services::clients::clients_shared;
use crate::services::domains::domains_shared;
use crate::services::{ServerApp, TenantryParams};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedTenant {
    pub schema_name: String,
    pub name: String,
    pub domains: Vec<String>,
}

pub fn parse_seed(raw: &str) -> Result<Vec<SeedTenant>> {
    let mut out = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let mut parts = entry.splitn(3, ':');
        let (Some(schema_name), Some(name), Some(hosts)) = (parts.next(), parts.next(), parts.next()) else {
            bail!("Invalid seed tenant '{entry}': expected schema:name:host1|host2");
        };

        let domains: Vec<String> = hosts
            .split('|')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
        if domains.is_empty() {
            bail!("Invalid seed tenant '{entry}': at least one host is required");
        }

        out.push(SeedTenant {
            schema_name: schema_name.trim().to_string(),
            name: name.trim().to_string(),
            domains,
        });
    }

    Ok(out)
}

/// Create each tenant and its domains through the services, hooks included.
pub async fn seed_tenants(app: &ServerApp, seeds: &[SeedTenant]) -> Result<()> {
    let clients = app.service(clients_shared::SERVICE)?;
    let domains = app.service(domains_shared::SERVICE)?;

    for seed in seeds {
        let client = clients
            .create(
                TenantContext::public(),
                json!({"name": seed.name, "schema_name": seed.schema_name}),
                TenantryParams::default(),
            )
            .await?;
        let tenant_id = client
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("seeded client '{}' has no id", seed.schema_name))?;

        for (i, host) in seed.domains.iter().enumerate() {
            domains
                .create(
                    TenantContext::public(),
                    json!({"domain": host, "tenant_id": tenant_id, "is_primary": i == 0}),
                    TenantryParams::default(),
                )
                .await?;
        }

        tracing::info!(schema = %seed.schema_name, domains = seed.domains.len(), "seeded tenant");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::{self, TenantryState};

    #[test]
    fn parses_tenants_and_hosts() {
        let seeds = parse_seed("acme:Acme Corp:acme.localhost|acme.example.com, globex:Globex:globex.localhost").unwrap();

        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].schema_name, "acme");
        assert_eq!(seeds[0].name, "Acme Corp");
        assert_eq!(seeds[0].domains, vec!["acme.localhost", "acme.example.com"]);
        assert_eq!(seeds[1].domains, vec!["globex.localhost"]);
    }

    #[test]
    fn rejects_entries_without_hosts() {
        assert!(parse_seed("acme:Acme").is_err());
        assert!(parse_seed("acme:Acme: | ").is_err());
        assert!(parse_seed("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeding_creates_clients_and_primary_domain() {
        let app = ServerApp::new();
        let state = Arc::new(TenantryState::default());
        services::configure(&app, Arc::clone(&state)).unwrap();

        let seeds = parse_seed("acme:Acme:ACME.localhost|www.acme.test").unwrap();
        seed_tenants(&app, &seeds).await.unwrap();

        let domains = app
            .service(domains_shared::SERVICE)
            .unwrap()
            .find(TenantContext::public(), TenantryParams::default())
            .await
            .unwrap();

        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0]["domain"], "acme.localhost");
        assert_eq!(domains[0]["is_primary"], true);
        assert_eq!(domains[1]["is_primary"], false);

        let resolver = services::DomainResolver::new(state);
        let partition = resolver.partition_for_host("www.acme.test").await.unwrap();
        assert!(partition.starts_with("acme#"), "{partition}");
    }

    #[tokio::test]
    async fn invalid_schema_names_fail_seeding() {
        let app = ServerApp::new();
        services::configure(&app, Arc::new(TenantryState::default())).unwrap();

        let seeds = parse_seed("Public:Oops:oops.test").unwrap();
        assert!(seed_tenants(&app, &seeds).await.is_err());
    }
}
