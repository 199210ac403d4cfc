//! tenantry-core: framework-agnostic core for Tenantry.
//!
//! Services receive an explicit [`TenantContext`] on every call; nothing in
//! this crate keeps a process-wide "current tenant".

pub mod app;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod registry;
pub mod service;
pub mod tenant;

#[cfg(feature = "adapters")]
pub mod adapters;

pub use app::{ServiceCaller, ServiceHandle, TenantryApp};
pub use config::{ConfigSnapshot, TenantryConfig};
pub use errors::{ErrorKind, TenantryError};
pub use hooks::{
    AfterHook, AroundHook, BeforeHook, ErrorHook, HookContext, HookResult, Next, ServiceHooks,
};
pub use registry::ServiceRegistry;
pub use service::{ServiceCapabilities, ServiceMethodKind, TenantryService};
pub use tenant::{PartitionResolver, PublicResolver, RequestTarget, TenantContext, TenantId};
