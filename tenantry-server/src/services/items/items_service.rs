use std::sync::Arc;

use crate::services::adapters::PartitionAdapter;
use crate::services::{TableKind, TenantryState};

use super::items_shared;

pub fn adapter(state: Arc<TenantryState>) -> PartitionAdapter {
    PartitionAdapter::new(state, TableKind::Items, items_shared::crud_capabilities())
        .search(&["name", "description"])
        .created_at("created_at")
}
