use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock as SyncRwLock};

use serde_json::Value;
use tenantry_core::tenant::PUBLIC_SCHEMA;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type TenantryParams = tenantry_axum::params::RestParams;

/// Storage key of a tenant's partition.
///
/// The client id is part of the key, so a schema name registered again
/// after its client was deleted starts from an empty partition.
pub fn partition_key(schema_name: &str, client_id: i64) -> String {
    format!("{schema_name}#{client_id}")
}

/// Rows of one partition, ordered by id.
pub type PartitionRows = BTreeMap<i64, Value>;

/// One logical table, split by partition (schema name).
///
/// Ids come from a single sequence shared by every partition, so an id is
/// never reused across tenants.
#[derive(Default)]
pub struct Table {
    rows: RwLock<HashMap<String, PartitionRows>>,
    seq: AtomicI64,
}

impl Table {
    pub fn next_id(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, HashMap<String, PartitionRows>> {
        self.rows.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, PartitionRows>> {
        self.rows.write().await
    }

    /// First row of `partition` matching `pred`.
    pub async fn find_one<F>(&self, partition: &str, pred: F) -> Option<Value>
    where
        F: Fn(&Value) -> bool,
    {
        let rows = self.rows.read().await;
        rows.get(partition)?.values().find(|v| pred(v)).cloned()
    }

    pub async fn drop_partition(&self, partition: &str) -> usize {
        let mut rows = self.rows.write().await;
        rows.remove(partition).map(|p| p.len()).unwrap_or(0)
    }

    /// Delete every row of `partition` matching `pred`; returns how many went.
    pub async fn delete_where<F>(&self, partition: &str, pred: F) -> usize
    where
        F: Fn(&Value) -> bool,
    {
        let mut rows = self.rows.write().await;
        let Some(part) = rows.get_mut(partition) else {
            return 0;
        };
        let before = part.len();
        part.retain(|_, v| !pred(v));
        before - part.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    Clients,
    Domains,
    Members,
    Regions,
    Items,
}

/// The in-memory store. `clients` and `domains` live in the public
/// partition; the rest are per tenant.
///
/// Lock order when two tables are held: regions before members.
#[derive(Default)]
pub struct TenantryState {
    pub clients: Table,
    pub domains: Table,
    pub members: Table,
    pub regions: Table,
    pub items: Table,
    open: SyncRwLock<HashSet<String>>,
}

impl TenantryState {
    pub fn table(&self, kind: TableKind) -> &Table {
        match kind {
            TableKind::Clients => &self.clients,
            TableKind::Domains => &self.domains,
            TableKind::Members => &self.members,
            TableKind::Regions => &self.regions,
            TableKind::Items => &self.items,
        }
    }

    /// Accept writes to `partition` from now on.
    pub fn open_partition(&self, partition: &str) {
        self.open
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(partition.to_string());
    }

    /// Whether rows may be written to `partition`. Checked by writers while
    /// they hold the table's write lock.
    pub fn is_open(&self, partition: &str) -> bool {
        partition == PUBLIC_SCHEMA
            || self
                .open
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(partition)
    }

    /// Close the partition, then drop everything it holds. Writers that
    /// resolved it earlier are refused once it is closed.
    pub async fn drop_tenant_partition(&self, partition: &str) {
        self.open
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(partition);

        let mut dropped = 0;
        for table in [&self.regions, &self.members, &self.items] {
            dropped += table.drop_partition(partition).await;
        }
        tracing::info!(partition, rows = dropped, "dropped tenant partition");
    }
}
