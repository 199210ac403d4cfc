use std::collections::HashMap;

use axum::extract::{FromRequestParts, Path};
use axum::http::header::HOST;
use axum::http::request::Parts;
use tenantry_core::{RequestTarget, TenantContext};

use crate::{TenantryAxumError, TenantryAxumState};

/// The partition a request runs against.
///
/// Built from the `Host` header and the matched path parameters
/// (`{domain}`, `{region_id}`), then handed to the state's resolver.
/// Rejects with the resolver's error, so an unknown host never reaches a
/// handler.
#[derive(Debug, Clone)]
pub struct ResolvedTenant(pub TenantContext);

fn host_of(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.host().map(str::to_string))
}

impl<R, P> FromRequestParts<TenantryAxumState<R, P>> for ResolvedTenant
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    type Rejection = TenantryAxumError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &TenantryAxumState<R, P>,
    ) -> Result<Self, Self::Rejection> {
        let selectors = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Path(p)| p)
            .unwrap_or_default();

        let host = host_of(parts);
        let target = RequestTarget::new(host.as_deref(), selectors);
        let tenant = state.resolver.resolve(&target).await?;

        tracing::debug!(
            host = target.host.as_deref().unwrap_or("-"),
            partition = tenant.partition(),
            region = tenant.region.as_deref().unwrap_or("-"),
            "resolved tenant"
        );
        Ok(Self(tenant))
    }
}
