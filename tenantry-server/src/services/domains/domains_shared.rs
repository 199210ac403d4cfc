use std::sync::Arc;

use tenantry_core::ServiceCapabilities;

use crate::services::ServerApp;

use super::domains_hooks::{NormalizeDomainHost, ValidateDomainTenant};

pub const SERVICE: &str = "domains";

pub const SCHEMA_ERROR: &str = "Domains schema validation failed";

pub fn registry_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::registry()
}

pub fn register_hooks(app: &ServerApp) -> anyhow::Result<()> {
    super::domains_schema::register(app)?;

    app.service(SERVICE)?.hooks(|h| {
        h.before_create(Arc::new(NormalizeDomainHost));
        h.before_create(Arc::new(ValidateDomainTenant));
    });

    Ok(())
}
