use tenantry_core::ServiceCapabilities;

use crate::services::ServerApp;

pub const SERVICE: &str = "members";

pub const SCHEMA_ERROR: &str = "Members schema validation failed";

pub fn crud_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::standard_crud()
}

pub fn register_hooks(app: &ServerApp) -> anyhow::Result<()> {
    super::members_schema::register(app)
}
