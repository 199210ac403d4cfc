use anyhow::Result;
use async_trait::async_trait;

use crate::errors::TenantryError;
use crate::tenant::TenantContext;

/// Standard service methods: find, get, create, update, patch, remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
}

impl ServiceMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethodKind::Find => "find",
            ServiceMethodKind::Get => "get",
            ServiceMethodKind::Create => "create",
            ServiceMethodKind::Update => "update",
            ServiceMethodKind::Patch => "patch",
            ServiceMethodKind::Remove => "remove",
        }
    }
}

/// Which methods a service exposes to transports.
///
/// Adapters (like tenantry-axum) answer calls to anything else with
/// `MethodNotAllowed`.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove],
        }
    }

    /// Registry-style surface: list, fetch, add, remove.
    pub fn registry() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Remove],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: ServiceMethodKind) -> bool {
        self.allowed_methods.contains(&method)
    }
}

fn not_implemented(method: &str) -> anyhow::Error {
    TenantryError::not_implemented(format!("Method not implemented: {method}")).into_anyhow()
}

/// Core service trait.
///
/// - `find`   → list rows of the active partition
/// - `get`    → fetch one by id
/// - `create` → insert one
/// - `update` → replace (mandatory fields required)
/// - `patch`  → partial update
/// - `remove` → delete one
///
/// Every method takes the caller's [`TenantContext`]; an implementation must
/// only ever touch rows of `ctx.partition()`. Unimplemented methods answer
/// `NotImplemented`, so a service overrides only what it supports.
#[async_trait]
pub trait TenantryService<R, P = ()>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    async fn find(&self, _ctx: &TenantContext, _params: P) -> Result<Vec<R>> {
        Err(not_implemented("find"))
    }

    async fn get(&self, _ctx: &TenantContext, _id: &str, _params: P) -> Result<R> {
        Err(not_implemented("get"))
    }

    async fn create(&self, _ctx: &TenantContext, _data: R, _params: P) -> Result<R> {
        Err(not_implemented("create"))
    }

    async fn update(&self, _ctx: &TenantContext, _id: &str, _data: R, _params: P) -> Result<R> {
        Err(not_implemented("update"))
    }

    async fn patch(&self, _ctx: &TenantContext, _id: &str, _data: R, _params: P) -> Result<R> {
        Err(not_implemented("patch"))
    }

    async fn remove(&self, _ctx: &TenantContext, _id: &str, _params: P) -> Result<R> {
        Err(not_implemented("remove"))
    }
}
