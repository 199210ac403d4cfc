pub mod domains_hooks;
pub mod domains_schema;
pub mod domains_service;
pub mod domains_shared;

pub use domains_service::DomainsService;
