use std::sync::Arc;

use serde_json::Value;
use tenantry_core::{TenantryApp, TenantryService};

pub mod adapters;
pub mod clients;
pub mod domains;
pub mod items;
pub mod members;
pub mod regions;
pub mod resolver;
pub mod types;

pub use resolver::DomainResolver;
pub use types::{TableKind, TenantryParams, TenantryState};

pub type ServerApp = TenantryApp<Value, TenantryParams>;
pub type DynService = Arc<dyn TenantryService<Value, TenantryParams>>;

pub struct TenantryServices {
    pub clients: DynService,
    pub domains: DynService,
    pub members: DynService,
    pub regions: DynService,
    pub items: DynService,
}

/// Register every service and its hooks. Transports mount them afterwards.
pub fn configure(app: &ServerApp, state: Arc<TenantryState>) -> anyhow::Result<TenantryServices> {
    let clients: DynService = Arc::new(clients::ClientsService::new(Arc::clone(&state)));
    let domains: DynService = Arc::new(domains::DomainsService::new(Arc::clone(&state)));
    let members: DynService = Arc::new(members::members_service::adapter(Arc::clone(&state)));
    let regions: DynService = Arc::new(regions::regions_service::adapter(Arc::clone(&state)));
    let items: DynService = Arc::new(items::items_service::adapter(Arc::clone(&state)));

    app.register_service(clients::clients_shared::SERVICE, Arc::clone(&clients));
    app.register_service(domains::domains_shared::SERVICE, Arc::clone(&domains));
    app.register_service(members::members_shared::SERVICE, Arc::clone(&members));
    app.register_service(regions::regions_shared::SERVICE, Arc::clone(&regions));
    app.register_service(items::items_shared::SERVICE, Arc::clone(&items));

    clients::clients_shared::register_hooks(app)?;
    domains::domains_shared::register_hooks(app)?;
    members::members_shared::register_hooks(app)?;
    regions::regions_shared::register_hooks(app)?;
    items::items_shared::register_hooks(app)?;

    Ok(TenantryServices {
        clients,
        domains,
        members,
        regions,
        items,
    })
}
