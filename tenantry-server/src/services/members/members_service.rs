use std::sync::Arc;

use crate::services::adapters::{PartitionAdapter, Reference};
use crate::services::{TableKind, TenantryState};

use super::members_shared;

/// A member's `region_id` must name a region of the same tenant.
const REGION: Reference = Reference {
    field: "region_id",
    table: TableKind::Regions,
    key: "region_id",
    message: "region not found",
};

/// Members: searchable by name, email and phone; narrowed by `region_id`
/// when the request carries a region.
pub fn adapter(state: Arc<TenantryState>) -> PartitionAdapter {
    PartitionAdapter::new(state, TableKind::Members, members_shared::crud_capabilities())
        .search(&["name", "email", "phone"])
        .scoped_by("region_id")
        .references(&REGION)
        .created_at("created_at")
}
