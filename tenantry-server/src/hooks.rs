use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tenantry_core::hooks::{AroundHook, HookContext, Next};

use crate::services::{ServerApp, TenantryParams};

/// One line per service call: who, where, how long, and how it ended.
///
/// Successful calls log at debug, or at info when `log.calls` is set.
pub struct LogAround;

#[async_trait]
impl AroundHook<Value, TenantryParams> for LogAround {
    async fn run(&self, ctx: &mut HookContext<Value, TenantryParams>, next: Next<Value, TenantryParams>) -> Result<()> {
        let started = Instant::now();
        let service = ctx.service.clone();
        let method = ctx.method.as_str();
        let partition = ctx.tenant.partition().to_string();
        let region = ctx.tenant.region.clone().unwrap_or_else(|| "-".to_string());
        let loud = ctx.config.get_bool("log.calls").unwrap_or(false);

        let res = next.run(ctx).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &res {
            Ok(()) if loud => tracing::info!(
                service = %service,
                method,
                partition = %partition,
                region = %region,
                elapsed_ms,
                "service call"
            ),
            Ok(()) => tracing::debug!(
                service = %service,
                method,
                partition = %partition,
                region = %region,
                elapsed_ms,
                "service call"
            ),
            Err(e) => tracing::info!(
                service = %service,
                method,
                partition = %partition,
                region = %region,
                elapsed_ms,
                error = %e,
                "service call failed"
            ),
        }

        res
    }
}

pub fn global_hooks(app: &ServerApp) {
    app.hooks(|h| {
        h.around_all(Arc::new(LogAround));
    });
}
