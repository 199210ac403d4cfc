use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};

use crate::config::{ConfigSnapshot, TenantryConfig};
use crate::errors::TenantryError;
use crate::hooks::{collect_method_hooks, HookContext, HookResult, Next, ServiceHooks};
use crate::{ServiceCapabilities, ServiceMethodKind, ServiceRegistry, TenantContext, TenantryService};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

struct TenantryAppInner<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    registry: RwLock<ServiceRegistry<R, P>>,
    global_hooks: RwLock<ServiceHooks<R, P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<R, P>>>,
    config: RwLock<TenantryConfig>,
}

/// The central application container.
///
/// Framework-agnostic. Holds:
/// - service registry
/// - app hooks
/// - per-service hooks
/// - config
///
/// Cloning is cheap; clones share everything.
pub struct TenantryApp<R, P = ()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    inner: Arc<TenantryAppInner<R, P>>,
}

type HooksForMethod<R, P> = (
    Vec<Arc<dyn crate::AroundHook<R, P>>>,
    Vec<Arc<dyn crate::BeforeHook<R, P>>>,
    Vec<Arc<dyn crate::AfterHook<R, P>>>,
    Vec<Arc<dyn crate::ErrorHook<R, P>>>,
);

impl<R, P> Default for TenantryApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for TenantryApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> TenantryApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TenantryAppInner {
                registry: RwLock::new(ServiceRegistry::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(TenantryConfig::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn TenantryService<R, P>>)
    where
        S: Into<String>,
    {
        write(&self.inner.registry).register(name, service);
    }

    /// App-wide hooks, applied to every service.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut g = write(&self.inner.global_hooks);
        f(&mut g);
    }

    pub(crate) fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut map = write(&self.inner.service_hooks);
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    /// Look up a registered service by name.
    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let svc = read(&self.inner.registry)
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("Service not found: {name}"))?;

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service: svc,
        })
    }

    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.inner.registry)
            .names()
            .map(|s| s.to_string())
            .collect();
        names.sort();
        names
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        write(&self.inner.config).set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        read(&self.inner.config).get(key).map(|v| v.to_string())
    }

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        read(&self.inner.config).snapshot()
    }
}

/// A named service bound to its app; calls go through the hook pipeline.
pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: TenantryApp<R, P>,
    name: String,
    service: Arc<dyn TenantryService<R, P>>,
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    /// Service-level hooks: `app.service("members")?.hooks(|h| { ... })`.
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        self.app.configure_service_hooks(&self.name, f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &Arc<dyn TenantryService<R, P>> {
        &self.service
    }

    pub fn capabilities(&self) -> ServiceCapabilities {
        self.service.capabilities()
    }

    /// App hooks first, then service hooks, except `after`, where the
    /// service's own hooks run before the app-wide ones.
    fn collect_hooks_for_method(&self, method: &ServiceMethodKind) -> HooksForMethod<R, P> {
        let g = read(&self.app.inner.global_hooks);
        let map = read(&self.app.inner.service_hooks);
        let s = map.get(&self.name);

        let mut around = g.around_all.clone();
        let mut before = collect_method_hooks(&g.before_all, &g.before_by_method, method);
        let mut after = Vec::new();
        let mut error = collect_method_hooks(&g.error_all, &g.error_by_method, method);

        if let Some(h) = s {
            around.extend(h.around_all.iter().cloned());
            before.extend(collect_method_hooks(&h.before_all, &h.before_by_method, method));
            after.extend(collect_method_hooks(&h.after_all, &h.after_by_method, method));
            error.extend(collect_method_hooks(&h.error_all, &h.error_by_method, method));
        }
        after.extend(collect_method_hooks(&g.after_all, &g.after_by_method, method));

        (around, before, after, error)
    }

    fn context(&self, tenant: TenantContext, method: ServiceMethodKind, params: P) -> HookContext<R, P> {
        HookContext::new(
            tenant,
            self.name.clone(),
            method,
            params,
            ServiceCaller::new(self.app.clone()),
            self.app.config_snapshot(),
        )
    }

    /// around → before → service call → after, then error hooks on failure.
    async fn run_pipeline(&self, mut ctx: HookContext<R, P>) -> Result<HookContext<R, P>> {
        let (around, before, after, error) = self.collect_hooks_for_method(&ctx.method);
        let next = Next::new(around, before, after, Arc::clone(&self.service));

        if let Err(e) = next.run(&mut ctx).await {
            ctx.error = Some(e);

            for h in &error {
                if let Err(hook_err) = h.run(&mut ctx).await {
                    ctx.error = Some(hook_err);
                }
            }

            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        Ok(ctx)
    }

    fn expect_one(ctx: HookContext<R, P>) -> Result<R> {
        match ctx.result {
            Some(HookResult::One(v)) => Ok(v),
            Some(HookResult::Many(_)) => Err(TenantryError::general_error(format!(
                "{}() produced many results",
                ctx.method.as_str()
            ))
            .into_anyhow()),
            None => Err(TenantryError::general_error(format!(
                "{}() produced no result",
                ctx.method.as_str()
            ))
            .into_anyhow()),
        }
    }

    pub async fn find(&self, tenant: TenantContext, params: P) -> Result<Vec<R>> {
        let ctx = self.context(tenant, ServiceMethodKind::Find, params);
        let ctx = self.run_pipeline(ctx).await?;

        match ctx.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(v)) => Ok(vec![v]),
            None => Ok(vec![]),
        }
    }

    pub async fn get(&self, tenant: TenantContext, id: &str, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Get, params);
        ctx.id = Some(id.to_string());
        Self::expect_one(self.run_pipeline(ctx).await?)
    }

    pub async fn create(&self, tenant: TenantContext, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Create, params);
        ctx.data = Some(data);
        Self::expect_one(self.run_pipeline(ctx).await?)
    }

    pub async fn update(&self, tenant: TenantContext, id: &str, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Update, params);
        ctx.id = Some(id.to_string());
        ctx.data = Some(data);
        Self::expect_one(self.run_pipeline(ctx).await?)
    }

    pub async fn patch(&self, tenant: TenantContext, id: &str, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Patch, params);
        ctx.id = Some(id.to_string());
        ctx.data = Some(data);
        Self::expect_one(self.run_pipeline(ctx).await?)
    }

    pub async fn remove(&self, tenant: TenantContext, id: &str, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Remove, params);
        ctx.id = Some(id.to_string());
        Self::expect_one(self.run_pipeline(ctx).await?)
    }
}

/// Lets hooks reach other services without going back through the
/// transport. Calls made this way skip the target's hooks.
pub struct ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: TenantryApp<R, P>,
}

impl<R, P> Clone for ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
        }
    }
}

impl<R, P> ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new(app: TenantryApp<R, P>) -> Self {
        Self { app }
    }

    pub fn service(&self, name: &str) -> Result<Arc<dyn TenantryService<R, P>>> {
        Ok(Arc::clone(self.app.service(name)?.inner()))
    }
}
