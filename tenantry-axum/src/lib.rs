//! tenantry-axum: Axum adapter for Tenantry.
//!
//! Builds REST routers from Tenantry services. Every handler resolves the
//! request's partition through one [`ResolvedTenant`] extractor before the
//! service is called.

pub mod app;
pub mod params;
pub mod resolve;
pub mod rest;
pub mod state;
mod error;

pub use error::{TenantryAxumError, INTERNAL_ERROR};
pub use resolve::ResolvedTenant;
pub use state::TenantryAxumState;

pub use app::{axum, AxumApp};
