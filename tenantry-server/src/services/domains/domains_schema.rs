use serde::{Deserialize, Serialize};
use tenantry_core::tenant::normalize_host;
use tenantry_schema::validate_with;
use validator::{Validate, ValidationError};

use crate::services::ServerApp;

use super::domains_shared::{SCHEMA_ERROR, SERVICE};

/// Letters, digits, dots and hyphens once normalized; at most 253 chars.
fn hostname_rule(value: &str) -> Result<(), ValidationError> {
    let host = normalize_host(value);
    let valid = !host.is_empty()
        && host.len() <= 253
        && host
            .split('.')
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("hostname").with_message("must be a valid hostname".into()))
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateDomain {
    #[validate(custom(function = "hostname_rule"))]
    pub domain: String,
    pub tenant_id: i64,
    #[serde(default)]
    pub is_primary: bool,
}

pub fn register(app: &ServerApp) -> anyhow::Result<()> {
    app.service(SERVICE)?.hooks(|h| {
        h.before_create(validate_with::<CreateDomain>(SCHEMA_ERROR));
    });
    Ok(())
}
