use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tenantry_core::errors::TenantryError;
use tenantry_core::tenant::TenantContext;
use tenantry_core::ServiceCapabilities;
use tokio::sync::RwLockReadGuard;

use crate::services::types::{PartitionRows, Table, TableKind};
use crate::services::{TenantryParams, TenantryState};

/// A uniqueness rule over `fields`, checked inside the row's partition.
///
/// With `only_if`, only rows where that field is `true` take part, which
/// expresses "at most one primary domain per tenant".
pub struct UniqueKey {
    pub fields: &'static [&'static str],
    pub only_if: Option<&'static str>,
    pub message: &'static str,
}

/// `field` must match the `key` column of a row in `table`, same partition.
///
/// Checked while the referenced table is read-locked, so it holds against a
/// concurrent [`Cascade`] delete.
pub struct Reference {
    pub field: &'static str,
    pub table: TableKind,
    pub key: &'static str,
    pub message: &'static str,
}

/// Removing a row also removes the rows of `table` whose `field` equals the
/// removed row's `key`, under both write locks.
pub struct Cascade {
    pub table: TableKind,
    pub field: &'static str,
    pub key: &'static str,
}

/// Generic CRUD over one [`Table`], always confined to `ctx.partition()`.
///
/// - `scope_field`: the column a region-scoped context narrows on
/// - `created_field`: stamped with the creation time, never overwritten
/// - `search_fields`: matched by `?search=`, case-insensitive substring
///
/// A referenced table is locked before this one, and this one before a
/// cascaded table.
pub struct PartitionAdapter {
    pub state: Arc<TenantryState>,
    pub table: TableKind,
    pub capabilities: ServiceCapabilities,
    pub search_fields: &'static [&'static str],
    pub unique: &'static [UniqueKey],
    pub scope_field: Option<&'static str>,
    pub created_field: Option<&'static str>,
    pub reference: Option<&'static Reference>,
    pub cascade: Option<&'static Cascade>,
}

type Partitions = HashMap<String, PartitionRows>;

fn now_ts() -> String {
    Utc::now().to_rfc3339()
}

/// Ids are integers; anything else cannot match a row.
fn parse_id(id: &str) -> Result<i64> {
    id.trim()
        .parse::<i64>()
        .map_err(|_| TenantryError::object_not_found().into_anyhow())
}

fn not_found() -> anyhow::Error {
    TenantryError::object_not_found().into_anyhow()
}

fn text_of(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl PartitionAdapter {
    pub fn new(state: Arc<TenantryState>, table: TableKind, capabilities: ServiceCapabilities) -> Self {
        Self {
            state,
            table,
            capabilities,
            search_fields: &[],
            unique: &[],
            scope_field: None,
            created_field: None,
            reference: None,
            cascade: None,
        }
    }

    pub fn references(mut self, reference: &'static Reference) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn cascades(mut self, cascade: &'static Cascade) -> Self {
        self.cascade = Some(cascade);
        self
    }

    pub fn search(mut self, fields: &'static [&'static str]) -> Self {
        self.search_fields = fields;
        self
    }

    pub fn unique(mut self, keys: &'static [UniqueKey]) -> Self {
        self.unique = keys;
        self
    }

    pub fn scoped_by(mut self, field: &'static str) -> Self {
        self.scope_field = Some(field);
        self
    }

    pub fn created_at(mut self, field: &'static str) -> Self {
        self.created_field = Some(field);
        self
    }

    fn table(&self) -> &Table {
        self.state.table(self.table)
    }

    /// The region a scoped context narrows to, if this table is scoped.
    fn scope<'a>(&self, ctx: &'a TenantContext) -> Option<(&'static str, &'a str)> {
        Some((self.scope_field?, ctx.region.as_deref()?))
    }

    fn in_scope(&self, ctx: &TenantContext, row: &Value) -> bool {
        match self.scope(ctx) {
            Some((field, region)) => row.get(field).and_then(|v| v.as_str()) == Some(region),
            None => true,
        }
    }

    fn matches_search(&self, row: &Value, term: &str) -> bool {
        let term = term.to_lowercase();
        self.search_fields
            .iter()
            .filter_map(|f| text_of(row.get(*f)))
            .any(|v| v.contains(&term))
    }

    fn check_unique(&self, rows: Option<&PartitionRows>, candidate: &Map<String, Value>, skip: Option<i64>) -> Result<()> {
        let Some(rows) = rows else {
            return Ok(());
        };

        let flagged = |obj: Option<&Map<String, Value>>, flag: &str| {
            obj.and_then(|o| o.get(flag)).and_then(|v| v.as_bool()).unwrap_or(false)
        };

        for key in self.unique {
            if let Some(flag) = key.only_if {
                if !flagged(Some(candidate), flag) {
                    continue;
                }
            }
            let wanted: Vec<Option<&Value>> = key.fields.iter().map(|f| candidate.get(*f)).collect();
            if wanted.iter().any(|v| v.is_none_or(Value::is_null)) {
                continue;
            }

            let clash = rows.iter().any(|(id, row)| {
                Some(*id) != skip
                    && key.only_if.is_none_or(|flag| flagged(row.as_object(), flag))
                    && key
                        .fields
                        .iter()
                        .zip(&wanted)
                        .all(|(f, w)| row.get(*f) == *w)
            });

            if clash {
                let mut errors = Map::new();
                errors.insert(key.fields[0].to_string(), json!([key.message]));
                return Err(TenantryError::conflict(key.message)
                    .with_errors(Value::Object(errors))
                    .into_anyhow());
            }
        }
        Ok(())
    }

    /// Writes to a partition whose tenant was deleted are refused.
    fn ensure_open(&self, ctx: &TenantContext) -> Result<()> {
        if self.state.is_open(ctx.partition()) {
            Ok(())
        } else {
            Err(TenantryError::unresolved_tenant().into_anyhow())
        }
    }

    fn check_reference(&self, referenced: Option<&Partitions>, ctx: &TenantContext, record: &Map<String, Value>) -> Result<()> {
        let (Some(r), Some(referenced)) = (self.reference, referenced) else {
            return Ok(());
        };
        let Some(wanted) = record.get(r.field).filter(|v| !v.is_null()) else {
            return Ok(());
        };

        let exists = referenced
            .get(ctx.partition())
            .is_some_and(|rows| rows.values().any(|row| row.get(r.key) == Some(wanted)));
        if exists {
            return Ok(());
        }

        let mut errors = Map::new();
        errors.insert(r.field.to_string(), json!([r.message]));
        Err(tenantry_schema::unprocessable(r.message, Value::Object(errors)))
    }

    async fn lock_referenced(&self) -> Option<RwLockReadGuard<'_, Partitions>> {
        match self.reference {
            Some(r) => Some(self.state.table(r.table).read().await),
            None => None,
        }
    }

    fn payload(data: Value) -> Result<Map<String, Value>> {
        match data {
            Value::Object(obj) => Ok(obj),
            _ => Err(TenantryError::bad_request("Expected a JSON object").into_anyhow()),
        }
    }

    pub async fn _find(&self, ctx: &TenantContext, params: TenantryParams) -> Result<Vec<Value>> {
        let term = params.query_str("search").map(str::to_string);

        let by_partition = self.table().read().await;
        let Some(rows) = by_partition.get(ctx.partition()) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .values()
            .filter(|row| self.in_scope(ctx, row))
            .filter(|row| term.as_deref().is_none_or(|t| self.matches_search(row, t)))
            .cloned()
            .collect())
    }

    pub async fn _get(&self, ctx: &TenantContext, id: &str, _params: TenantryParams) -> Result<Value> {
        let id = parse_id(id)?;
        let by_partition = self.table().read().await;
        by_partition
            .get(ctx.partition())
            .and_then(|rows| rows.get(&id))
            .filter(|row| self.in_scope(ctx, row))
            .cloned()
            .ok_or_else(not_found)
    }

    pub async fn _create(&self, ctx: &TenantContext, data: Value, _params: TenantryParams) -> Result<Value> {
        let mut obj = Self::payload(data)?;
        obj.remove("id");

        if let Some(field) = self.created_field {
            obj.insert(field.to_string(), Value::String(now_ts()));
        }
        if let Some((field, region)) = self.scope(ctx) {
            obj.insert(field.to_string(), Value::String(region.to_string()));
        }

        let referenced = self.lock_referenced().await;
        let mut by_partition = self.table().write().await;
        self.ensure_open(ctx)?;
        self.check_reference(referenced.as_deref(), ctx, &obj)?;
        self.check_unique(by_partition.get(ctx.partition()), &obj, None)?;

        let id = self.table().next_id();
        obj.insert("id".to_string(), json!(id));
        let value = Value::Object(obj);

        by_partition
            .entry(ctx.partition().to_string())
            .or_default()
            .insert(id, value.clone());

        Ok(value)
    }

    /// Overwrite fields present and non-null in `data`; omission or null
    /// keeps the stored value.
    async fn merge(&self, ctx: &TenantContext, id: &str, data: Value) -> Result<Value> {
        let id = parse_id(id)?;
        let patch = Self::payload(data)?;
        let scope_field = self.scope(ctx).map(|(field, _)| field);

        let referenced = self.lock_referenced().await;
        let mut by_partition = self.table().write().await;
        self.ensure_open(ctx)?;
        let rows = by_partition.get_mut(ctx.partition()).ok_or_else(not_found)?;

        let existing = rows
            .get(&id)
            .filter(|row| self.in_scope(ctx, row))
            .ok_or_else(not_found)?;

        let mut record = existing.as_object().cloned().unwrap_or_default();
        for (k, v) in patch {
            let fixed = k == "id" || Some(k.as_str()) == self.created_field || Some(k.as_str()) == scope_field;
            if fixed || v.is_null() {
                continue;
            }
            record.insert(k, v);
        }

        self.check_reference(referenced.as_deref(), ctx, &record)?;
        self.check_unique(Some(&*rows), &record, Some(id))?;

        let value = Value::Object(record);
        rows.insert(id, value.clone());
        Ok(value)
    }

    pub async fn _update(&self, ctx: &TenantContext, id: &str, data: Value, _params: TenantryParams) -> Result<Value> {
        self.merge(ctx, id, data).await
    }

    pub async fn _patch(&self, ctx: &TenantContext, id: &str, data: Value, _params: TenantryParams) -> Result<Value> {
        self.merge(ctx, id, data).await
    }

    pub async fn _remove(&self, ctx: &TenantContext, id: &str, _params: TenantryParams) -> Result<Value> {
        let id = parse_id(id)?;
        let mut by_partition = self.table().write().await;
        let rows = by_partition.get_mut(ctx.partition()).ok_or_else(not_found)?;

        if !rows.get(&id).is_some_and(|row| self.in_scope(ctx, row)) {
            return Err(not_found());
        }
        let removed = rows.remove(&id).ok_or_else(not_found)?;

        if let Some(c) = self.cascade {
            if let Some(key) = removed.get(c.key).filter(|v| !v.is_null()) {
                let mut dependents = self.state.table(c.table).write().await;
                let gone = dependents.get_mut(ctx.partition()).map_or(0, |rows| {
                    let before = rows.len();
                    rows.retain(|_, row| row.get(c.field) != Some(key));
                    before - rows.len()
                });
                tracing::debug!(partition = ctx.partition(), key = %key, rows = gone, "cascaded delete");
            }
        }

        Ok(removed)
    }
}

tenantry_core::tenantry_adapter!(
    PartitionAdapter,
    serde_json::Value,
    crate::services::TenantryParams
);
