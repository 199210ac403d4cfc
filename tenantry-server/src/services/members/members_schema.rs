use serde::{Deserialize, Serialize};
use tenantry_schema::validate_with;
use validator::Validate;

use crate::services::ServerApp;

use super::members_shared::{SCHEMA_ERROR, SERVICE};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateMember {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub region_id: Option<String>,
}

/// PUT: `name` is mandatory, everything else keeps its stored value when
/// omitted or null.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateMember {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub region_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct PatchMember {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub region_id: Option<String>,
}

pub fn register(app: &ServerApp) -> anyhow::Result<()> {
    app.service(SERVICE)?.hooks(|h| {
        h.before_create(validate_with::<CreateMember>(SCHEMA_ERROR));
        h.before_update(validate_with::<UpdateMember>(SCHEMA_ERROR));
        h.before_patch(validate_with::<PatchMember>(SCHEMA_ERROR));
    });
    Ok(())
}
