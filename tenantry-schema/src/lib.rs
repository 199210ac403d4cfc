//! tenantry-schema: turn JSON payloads into typed, validated values.
//!
//! Failures come back as `Unprocessable` errors whose `errors` member maps
//! each offending field to a list of messages:
//!
//! ```json
//! {"detail": "Members schema validation failed", "errors": {"name": ["is required"]}}
//! ```

mod errors;
mod hooks;
mod validate;

pub use errors::{schema_error, unprocessable, SchemaErrors};
pub use hooks::{validate_with, ValidateData};
pub use validate::validate;
