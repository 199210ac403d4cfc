use tenantry_core::ServiceCapabilities;

use crate::services::ServerApp;

pub const SERVICE: &str = "clients";

pub const SCHEMA_ERROR: &str = "Clients schema validation failed";

/// Tenants are listed, fetched, added and dropped; never edited in place.
pub fn registry_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::registry()
}

pub fn register_hooks(app: &ServerApp) -> anyhow::Result<()> {
    super::clients_schema::register(app)?;

    Ok(())
}
