use serde::{Deserialize, Serialize};
use tenantry_schema::validate_with;
use validator::Validate;

use crate::services::ServerApp;

use super::items_shared::{SCHEMA_ERROR, SERVICE};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateItem {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateItem {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct PatchItem {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

pub fn register(app: &ServerApp) -> anyhow::Result<()> {
    app.service(SERVICE)?.hooks(|h| {
        h.before_create(validate_with::<CreateItem>(SCHEMA_ERROR));
        h.before_update(validate_with::<UpdateItem>(SCHEMA_ERROR));
        h.before_patch(validate_with::<PatchItem>(SCHEMA_ERROR));
    });
    Ok(())
}
