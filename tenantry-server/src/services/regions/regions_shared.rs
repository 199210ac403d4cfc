use tenantry_core::ServiceCapabilities;

use crate::services::ServerApp;

pub const SERVICE: &str = "region";

pub const SCHEMA_ERROR: &str = "Regions schema validation failed";

pub fn crud_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::standard_crud()
}

pub fn register_hooks(app: &ServerApp) -> anyhow::Result<()> {
    super::regions_schema::register(app)
}
