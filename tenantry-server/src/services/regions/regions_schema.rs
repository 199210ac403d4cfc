use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tenantry_schema::validate_with;
use validator::{Validate, ValidationError};

use crate::services::ServerApp;

use super::regions_shared::{SCHEMA_ERROR, SERVICE};

/// First path segments taken by other routes; a region named after one of
/// them could never be reached through `/{region_id}/members`.
pub const RESERVED_REGION_IDS: &[&str] = &["client", "clients", "domains", "items", "members", "region"];

fn region_id_rule(value: &str) -> Result<(), ValidationError> {
    if RESERVED_REGION_IDS.contains(&value) {
        return Err(ValidationError::new("reserved").with_message(Cow::Borrowed("is reserved")));
    }
    if value.contains('/') {
        return Err(ValidationError::new("format").with_message(Cow::Borrowed("must not contain '/'")));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateRegion {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: String,
    #[validate(
        length(min = 1, max = 50, message = "must be 1 to 50 characters"),
        custom(function = "region_id_rule")
    )]
    pub region_id: String,
}

/// `region_id` is fixed once created; members refer to it.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateRegion {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct PatchRegion {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: Option<String>,
}

pub fn register(app: &ServerApp) -> anyhow::Result<()> {
    app.service(SERVICE)?.hooks(|h| {
        h.before_create(validate_with::<CreateRegion>(SCHEMA_ERROR));
        h.before_update(validate_with::<UpdateRegion>(SCHEMA_ERROR));
        h.before_patch(validate_with::<PatchRegion>(SCHEMA_ERROR));
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::region_id_rule;

    #[test]
    fn route_segments_are_not_region_ids() {
        assert!(region_id_rule("north").is_ok());
        assert!(region_id_rule("health").is_ok());
        for taken in ["items", "region", "members", "clients", "domains", "client"] {
            assert!(region_id_rule(taken).is_err(), "{taken}");
        }
        assert!(region_id_rule("a/b").is_err());
    }
}
