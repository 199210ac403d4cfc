use tenantry_core::ServiceCapabilities;

use crate::services::ServerApp;

pub const SERVICE: &str = "items";

pub const SCHEMA_ERROR: &str = "Items schema validation failed";

pub fn crud_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::standard_crud()
}

pub fn register_hooks(app: &ServerApp) -> anyhow::Result<()> {
    super::items_schema::register(app)?;

    Ok(())
}
