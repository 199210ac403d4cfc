use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tenantry_core::tenant::validate_schema_name;
use tenantry_schema::validate_with;
use validator::{Validate, ValidationError};

use crate::services::ServerApp;

use super::clients_shared::{SCHEMA_ERROR, SERVICE};

fn schema_name_rule(value: &str) -> Result<(), ValidationError> {
    validate_schema_name(value)
        .map_err(|reason| ValidationError::new("schema_name").with_message(Cow::Borrowed(reason)))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateClient {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
    #[validate(custom(function = "schema_name_rule"))]
    pub schema_name: String,
}

pub fn register(app: &ServerApp) -> anyhow::Result<()> {
    app.service(SERVICE)?.hooks(|h| {
        h.before_create(validate_with::<CreateClient>(SCHEMA_ERROR));
    });
    Ok(())
}
