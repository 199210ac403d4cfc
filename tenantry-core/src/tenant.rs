//! Core multi-tenant types for Tenantry.
//!
//! Every service call receives a [`TenantContext`] by reference. There is no
//! process-wide "current tenant": the partition a call runs against is
//! whatever context the caller hands in, so concurrent requests for
//! different tenants cannot observe each other's selection.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

/// Name of the shared partition holding the tenant and domain registries.
pub const PUBLIC_SCHEMA: &str = "public";

/// Longest schema identifier accepted (PostgreSQL's NAMEDATALEN - 1).
pub const MAX_SCHEMA_LEN: usize = 63;

/// A partition identifier. For tenants this is the schema name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(pub String);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context carried with every Tenantry operation.
///
/// `tenant_id` names the partition; `region` optionally narrows the call to
/// one region inside that partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    pub region: Option<String>,
}

impl TenantContext {
    /// Context for a tenant partition.
    pub fn new<S: Into<String>>(tenant: S) -> Self {
        Self {
            tenant_id: TenantId(tenant.into()),
            region: None,
        }
    }

    /// Context for the shared registry partition.
    pub fn public() -> Self {
        Self::new(PUBLIC_SCHEMA)
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn is_public(&self) -> bool {
        self.tenant_id.0 == PUBLIC_SCHEMA
    }

    /// The storage key for this context's partition.
    pub fn partition(&self) -> &str {
        &self.tenant_id.0
    }
}

impl Default for TenantContext {
    fn default() -> Self {
        Self::public()
    }
}

/// Check a schema identifier the way the schema-per-tenant backends do.
///
/// Returns a human-readable reason on failure.
pub fn validate_schema_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("must not be empty");
    }
    if name.len() > MAX_SCHEMA_LEN {
        return Err("must be at most 63 characters");
    }
    if name == PUBLIC_SCHEMA {
        return Err("is reserved");
    }
    if name.starts_with("pg_") {
        return Err("must not start with 'pg_'");
    }
    let mut chars = name.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Err("must start with a lowercase letter");
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Err("may only contain lowercase letters, digits and '_'");
    }
    Ok(())
}

/// Normalize an inbound hostname: lowercase, no port, no trailing dot.
///
/// A bare IPv6 literal (`::1`) has no port to strip; a bracketed one
/// (`[::1]:8080`) keeps its brackets.
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim();
    let bare_ipv6 = !host.starts_with('[') && host.matches(':').count() > 1;
    let host = match host.rsplit_once(':') {
        _ if bare_ipv6 => host,
        Some((h, port)) if !h.is_empty() && !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => h,
        _ => host,
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}

/// The transport-independent view of a request that partition resolution
/// needs: the hostname and any explicit selectors taken from the path
/// (`domain`, `region_id`).
#[derive(Debug, Clone, Default)]
pub struct RequestTarget {
    pub host: Option<String>,
    pub selectors: HashMap<String, String>,
}

impl RequestTarget {
    pub fn new(host: Option<&str>, selectors: HashMap<String, String>) -> Self {
        Self {
            host: host.map(normalize_host).filter(|h| !h.is_empty()),
            selectors,
        }
    }

    pub fn selector(&self, key: &str) -> Option<&str> {
        self.selectors
            .get(key)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Resolve a request to exactly one partition, once, before any entity
/// query runs.
///
/// Implementations must fail rather than fall back to some other tenant's
/// partition when nothing matches.
#[async_trait]
pub trait PartitionResolver: Send + Sync {
    async fn resolve(&self, target: &RequestTarget) -> anyhow::Result<TenantContext>;
}

/// Resolves every request to the shared registry partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicResolver;

#[async_trait]
impl PartitionResolver for PublicResolver {
    async fn resolve(&self, _target: &RequestTarget) -> anyhow::Result<TenantContext> {
        Ok(TenantContext::public())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_follow_identifier_rules() {
        assert!(validate_schema_name("acme").is_ok());
        assert!(validate_schema_name("acme_2").is_ok());
        assert!(validate_schema_name("").is_err());
        assert!(validate_schema_name("public").is_err());
        assert!(validate_schema_name("pg_catalog").is_err());
        assert!(validate_schema_name("2acme").is_err());
        assert!(validate_schema_name("Acme").is_err());
        assert!(validate_schema_name("ac-me").is_err());
        assert!(validate_schema_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn hosts_are_normalized() {
        assert_eq!(normalize_host("Acme.Example.com:8080"), "acme.example.com");
        assert_eq!(normalize_host("acme.example.com."), "acme.example.com");
        assert_eq!(normalize_host("localhost"), "localhost");
    }

    #[test]
    fn ipv6_hosts_keep_their_colons() {
        assert_eq!(normalize_host("::1"), "::1");
        assert_eq!(normalize_host("FE80::1"), "fe80::1");
        assert_eq!(normalize_host("[::1]:8080"), "[::1]");
        assert_eq!(normalize_host("[::1]"), "[::1]");
    }

    #[test]
    fn default_context_is_public() {
        let ctx = TenantContext::default();
        assert!(ctx.is_public());
        assert_eq!(ctx.region, None);
        assert!(!TenantContext::new("acme").is_public());
    }

    #[tokio::test]
    async fn public_resolver_ignores_host() {
        let target = RequestTarget::new(Some("acme.example.com"), HashMap::new());
        let ctx = PublicResolver.resolve(&target).await.unwrap();
        assert!(ctx.is_public());
    }
}
