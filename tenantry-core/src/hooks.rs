//! # Hooks
//!
//! Every service call runs through one pipeline:
//!
//! ```text
//! around → before → service method → after      (error hooks on failure)
//! ```
//!
//! Hooks are registered app-wide (`app.hooks(..)`) or per service
//! (`app.service("members")?.hooks(..)`). App hooks wrap service hooks for
//! `around` and `before`; `after` hooks run service-first, then app-wide.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::app::ServiceCaller;
use crate::config::ConfigSnapshot;
use crate::errors::TenantryError;
use crate::service::{ServiceMethodKind, TenantryService};
use crate::tenant::TenantContext;

/// Output of a service call as seen by after hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum HookResult<R> {
    One(R),
    Many(Vec<R>),
}

/// Context passed to hooks.
///
/// R = record type, P = params type (query, headers, ...)
pub struct HookContext<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub tenant: TenantContext,
    pub service: String,
    pub method: ServiceMethodKind,
    pub id: Option<String>,
    pub params: P,
    /// Input payload (create/update/patch).
    pub data: Option<R>,
    pub result: Option<HookResult<R>>,
    pub error: Option<anyhow::Error>,
    /// Direct access to other registered services.
    pub services: ServiceCaller<R, P>,
    pub config: ConfigSnapshot,
}

impl<R, P> HookContext<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new(
        tenant: TenantContext,
        service: impl Into<String>,
        method: ServiceMethodKind,
        params: P,
        services: ServiceCaller<R, P>,
        config: ConfigSnapshot,
    ) -> Self {
        Self {
            tenant,
            service: service.into(),
            method,
            id: None,
            params,
            data: None,
            result: None,
            error: None,
            services,
            config,
        }
    }
}

#[async_trait]
pub trait BeforeHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

#[async_trait]
pub trait AfterHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

/// Runs with `ctx.error` set. Taking the error out of the context recovers.
#[async_trait]
pub trait ErrorHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

/// Wraps the rest of the pipeline; must call `next.run(ctx)` to proceed.
#[async_trait]
pub trait AroundHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>, next: Next<R, P>) -> Result<()>;
}

struct Stage<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    before: Vec<Arc<dyn BeforeHook<R, P>>>,
    after: Vec<Arc<dyn AfterHook<R, P>>>,
    service: Arc<dyn TenantryService<R, P>>,
}

/// The remainder of the pipeline, handed to around hooks.
pub struct Next<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    around: Vec<Arc<dyn AroundHook<R, P>>>,
    stage: Arc<Stage<R, P>>,
}

impl<R, P> Next<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub(crate) fn new(
        around: Vec<Arc<dyn AroundHook<R, P>>>,
        before: Vec<Arc<dyn BeforeHook<R, P>>>,
        after: Vec<Arc<dyn AfterHook<R, P>>>,
        service: Arc<dyn TenantryService<R, P>>,
    ) -> Self {
        Self {
            around,
            stage: Arc::new(Stage {
                before,
                after,
                service,
            }),
        }
    }

    pub async fn run(mut self, ctx: &mut HookContext<R, P>) -> Result<()> {
        if !self.around.is_empty() {
            let hook = self.around.remove(0);
            return hook.run(ctx, self).await;
        }

        let stage = Arc::clone(&self.stage);
        for h in &stage.before {
            h.run(ctx).await?;
        }

        invoke(stage.service.as_ref(), ctx).await?;

        for h in &stage.after {
            h.run(ctx).await?;
        }
        Ok(())
    }
}

fn require_id<R, P>(ctx: &HookContext<R, P>) -> Result<String>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    ctx.id.clone().ok_or_else(|| {
        TenantryError::bad_request(format!("{}() requires an id", ctx.method.as_str()))
            .into_anyhow()
    })
}

fn require_data<R, P>(ctx: &mut HookContext<R, P>) -> Result<R>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    let method = ctx.method;
    ctx.data.take().ok_or_else(|| {
        TenantryError::bad_request(format!("{}() requires a payload", method.as_str()))
            .into_anyhow()
    })
}

/// Dispatch `ctx.method` to the service and store the outcome in `ctx.result`.
async fn invoke<R, P>(svc: &dyn TenantryService<R, P>, ctx: &mut HookContext<R, P>) -> Result<()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    let params = ctx.params.clone();
    let result = match ctx.method {
        ServiceMethodKind::Find => HookResult::Many(svc.find(&ctx.tenant, params).await?),
        ServiceMethodKind::Get => {
            let id = require_id(ctx)?;
            HookResult::One(svc.get(&ctx.tenant, &id, params).await?)
        }
        ServiceMethodKind::Create => {
            let data = require_data(ctx)?;
            HookResult::One(svc.create(&ctx.tenant, data, params).await?)
        }
        ServiceMethodKind::Update => {
            let id = require_id(ctx)?;
            let data = require_data(ctx)?;
            HookResult::One(svc.update(&ctx.tenant, &id, data, params).await?)
        }
        ServiceMethodKind::Patch => {
            let id = require_id(ctx)?;
            let data = require_data(ctx)?;
            HookResult::One(svc.patch(&ctx.tenant, &id, data, params).await?)
        }
        ServiceMethodKind::Remove => {
            let id = require_id(ctx)?;
            HookResult::One(svc.remove(&ctx.tenant, &id, params).await?)
        }
    };
    ctx.result = Some(result);
    Ok(())
}

type ByMethod<H> = HashMap<ServiceMethodKind, Vec<Arc<H>>>;

/// Hook registrations for one scope (app-wide or one service).
pub struct ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub around_all: Vec<Arc<dyn AroundHook<R, P>>>,
    pub before_all: Vec<Arc<dyn BeforeHook<R, P>>>,
    pub before_by_method: ByMethod<dyn BeforeHook<R, P>>,
    pub after_all: Vec<Arc<dyn AfterHook<R, P>>>,
    pub after_by_method: ByMethod<dyn AfterHook<R, P>>,
    pub error_all: Vec<Arc<dyn ErrorHook<R, P>>>,
    pub error_by_method: ByMethod<dyn ErrorHook<R, P>>,
}

impl<R, P> Default for ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            around_all: Vec::new(),
            before_all: Vec::new(),
            before_by_method: HashMap::new(),
            after_all: Vec::new(),
            after_by_method: HashMap::new(),
            error_all: Vec::new(),
            error_by_method: HashMap::new(),
        }
    }

    pub fn around_all(&mut self, hook: Arc<dyn AroundHook<R, P>>) -> &mut Self {
        self.around_all.push(hook);
        self
    }

    pub fn before_all(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before_all.push(hook);
        self
    }

    pub fn before(&mut self, method: ServiceMethodKind, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn before_create(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Create, hook)
    }

    pub fn before_update(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Update, hook)
    }

    pub fn before_patch(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Patch, hook)
    }

    pub fn before_remove(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Remove, hook)
    }

    pub fn after_all(&mut self, hook: Arc<dyn AfterHook<R, P>>) -> &mut Self {
        self.after_all.push(hook);
        self
    }

    pub fn after(&mut self, method: ServiceMethodKind, hook: Arc<dyn AfterHook<R, P>>) -> &mut Self {
        self.after_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn error_all(&mut self, hook: Arc<dyn ErrorHook<R, P>>) -> &mut Self {
        self.error_all.push(hook);
        self
    }

    pub fn error(&mut self, method: ServiceMethodKind, hook: Arc<dyn ErrorHook<R, P>>) -> &mut Self {
        self.error_by_method.entry(method).or_default().push(hook);
        self
    }
}

/// `*_all` hooks first, then the ones registered for `method`.
pub(crate) fn collect_method_hooks<H: ?Sized>(
    all: &[Arc<H>],
    by_method: &ByMethod<H>,
    method: &ServiceMethodKind,
) -> Vec<Arc<H>> {
    let mut out: Vec<Arc<H>> = all.to_vec();
    if let Some(hooks) = by_method.get(method) {
        out.extend(hooks.iter().cloned());
    }
    out
}
