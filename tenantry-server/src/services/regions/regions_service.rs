use std::sync::Arc;

use crate::services::adapters::{Cascade, PartitionAdapter, UniqueKey};
use crate::services::{TableKind, TenantryState};

use super::regions_shared;

const UNIQUE: &[UniqueKey] = &[UniqueKey {
    fields: &["region_id"],
    only_if: None,
    message: "region_id already exists",
}];

/// Members of a deleted region go with it.
const MEMBERS: Cascade = Cascade {
    table: TableKind::Members,
    field: "region_id",
    key: "region_id",
};

pub fn adapter(state: Arc<TenantryState>) -> PartitionAdapter {
    PartitionAdapter::new(state, TableKind::Regions, regions_shared::crud_capabilities())
        .search(&["name", "region_id"])
        .unique(UNIQUE)
        .cascades(&MEMBERS)
}
