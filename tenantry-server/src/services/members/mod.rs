pub mod members_schema;
pub mod members_service;
pub mod members_shared;
