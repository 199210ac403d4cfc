use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tenantry_core::hooks::{BeforeHook, HookContext};
use validator::Validate;

use crate::validate;

/// Before-hook that validates `ctx.data` as `T` and replaces it with the
/// re-serialized value, so unknown fields never reach the store.
pub struct ValidateData<T> {
    error_message: &'static str,
    _schema: PhantomData<fn() -> T>,
}

impl<T> ValidateData<T> {
    pub fn new(error_message: &'static str) -> Self {
        Self {
            error_message,
            _schema: PhantomData,
        }
    }
}

#[async_trait]
impl<T, P> BeforeHook<Value, P> for ValidateData<T>
where
    T: DeserializeOwned + Serialize + Validate + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<Value, P>) -> Result<()> {
        let Some(data) = ctx.data.as_ref() else {
            return Ok(());
        };

        let parsed: T = validate(data, self.error_message)?;
        ctx.data = Some(serde_json::to_value(parsed)?);
        Ok(())
    }
}

/// `Arc`'d [`ValidateData`], ready for `before_create` and friends.
pub fn validate_with<T>(error_message: &'static str) -> Arc<ValidateData<T>>
where
    T: DeserializeOwned + Serialize + Validate + 'static,
{
    Arc::new(ValidateData::new(error_message))
}
