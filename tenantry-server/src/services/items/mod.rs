pub mod items_schema;
pub mod items_service;
pub mod items_shared;
