use serde_json::{json, Map, Value};
use tenantry_core::errors::TenantryError;

/// Field → messages map, rendered as the `errors` member of a 422 body.
#[derive(Debug, Default)]
pub struct SchemaErrors {
    map: Map<String, Value>,
}

impl SchemaErrors {
    /// Errors that belong to the payload as a whole.
    pub fn push_schema(&mut self, msg: impl Into<String>) {
        self.push_field("_schema", msg);
    }

    pub fn push_field(&mut self, field: &str, msg: impl Into<String>) {
        let msg = Value::String(msg.into());
        match self.map.get_mut(field) {
            Some(Value::Array(arr)) => arr.push(msg),
            _ => {
                self.map.insert(field.to_string(), Value::Array(vec![msg]));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// `Ok(())` when nothing was pushed, otherwise a 422 carrying every field.
    pub fn into_result(self, message: &str) -> anyhow::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_unprocessable_anyhow(message))
        }
    }

    pub fn into_unprocessable_anyhow(self, message: &str) -> anyhow::Error {
        unprocessable(message, Value::Object(self.map))
    }
}

pub fn unprocessable(message: &str, errors: Value) -> anyhow::Error {
    TenantryError::unprocessable(message)
        .with_errors(errors)
        .into_anyhow()
}

pub fn schema_error(message: &str, msg: impl Into<String>) -> anyhow::Error {
    unprocessable(message, json!({"_schema": [msg.into()]}))
}
