pub mod regions_schema;
pub mod regions_service;
pub mod regions_shared;
