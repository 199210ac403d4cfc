use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    routing, Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tenantry_core::errors::TenantryError;
use tenantry_core::{ServiceHandle, ServiceMethodKind};

use crate::{
    params::{FromRestParams, RestParams},
    ResolvedTenant, TenantryAxumError, TenantryAxumState,
};

type PathParams = Path<HashMap<String, String>>;
type QueryParams = Query<HashMap<String, String>>;

fn map_json_rejection(rejection: JsonRejection) -> TenantryAxumError {
    TenantryError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.body_text()]}))
        .into()
}

fn rest_params<P: FromRestParams>(
    headers: &HeaderMap,
    query: HashMap<String, String>,
    method: &str,
    uri: &Uri,
) -> P {
    P::from_rest_params(RestParams::from_parts("rest", headers, query, method, uri))
}

/// The `{id}` segment; nested mounts may carry other parameters alongside it.
fn path_id(path: &HashMap<String, String>) -> Result<String, TenantryAxumError> {
    path.get("id")
        .cloned()
        .ok_or_else(|| TenantryError::bad_request("Missing id in path").into())
}

/// Look the service up and refuse verbs it does not expose.
fn allowed_service<R, P>(
    state: &TenantryAxumState<R, P>,
    service_name: &str,
    method: ServiceMethodKind,
) -> Result<ServiceHandle<R, P>, TenantryAxumError>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    let svc = state.app.service(service_name)?;
    if !svc.capabilities().allows(method) {
        return Err(TenantryError::method_not_allowed(format!(
            "Method '{}' is not allowed on '{service_name}'",
            method.as_str()
        ))
        .into());
    }
    Ok(svc)
}

/// `GET/POST /` and `GET/PUT/PATCH/DELETE /{id}` for one service.
///
/// Every handler resolves the partition through [`ResolvedTenant`] first;
/// a request that resolves to no tenant never reaches the service.
pub fn service_router<R, P>(service_name: Arc<String>, state: TenantryAxumState<R, P>) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    Router::new()
        .route(
            "/",
            routing::get({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<TenantryAxumState<R, P>>,
                      ResolvedTenant(tenant): ResolvedTenant,
                      headers: HeaderMap,
                      Query(query): QueryParams,
                      OriginalUri(uri): OriginalUri| async move {
                    let svc = allowed_service(&state, &service_name, ServiceMethodKind::Find)?;
                    let params = rest_params::<P>(&headers, query, "GET", &uri);

                    let res = svc.find(tenant, params).await?;
                    Ok::<_, TenantryAxumError>(Json(res))
                }
            })
            .post({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<TenantryAxumState<R, P>>,
                      ResolvedTenant(tenant): ResolvedTenant,
                      headers: HeaderMap,
                      Query(query): QueryParams,
                      OriginalUri(uri): OriginalUri,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let svc = allowed_service(&state, &service_name, ServiceMethodKind::Create)?;
                    let Json(data) = data.map_err(map_json_rejection)?;
                    let params = rest_params::<P>(&headers, query, "POST", &uri);

                    let res = svc.create(tenant, data, params).await?;
                    Ok::<_, TenantryAxumError>(Json(res))
                }
            }),
        )
        .route(
            "/{id}",
            routing::get({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<TenantryAxumState<R, P>>,
                      ResolvedTenant(tenant): ResolvedTenant,
                      headers: HeaderMap,
                      Query(query): QueryParams,
                      OriginalUri(uri): OriginalUri,
                      Path(path): PathParams| async move {
                    let svc = allowed_service(&state, &service_name, ServiceMethodKind::Get)?;
                    let id = path_id(&path)?;
                    let params = rest_params::<P>(&headers, query, "GET", &uri);

                    let res = svc.get(tenant, &id, params).await?;
                    Ok::<_, TenantryAxumError>(Json(res))
                }
            })
            .put({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<TenantryAxumState<R, P>>,
                      ResolvedTenant(tenant): ResolvedTenant,
                      headers: HeaderMap,
                      Query(query): QueryParams,
                      OriginalUri(uri): OriginalUri,
                      Path(path): PathParams,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let svc = allowed_service(&state, &service_name, ServiceMethodKind::Update)?;
                    let id = path_id(&path)?;
                    let Json(data) = data.map_err(map_json_rejection)?;
                    let params = rest_params::<P>(&headers, query, "PUT", &uri);

                    let res = svc.update(tenant, &id, data, params).await?;
                    Ok::<_, TenantryAxumError>(Json(res))
                }
            })
            .patch({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<TenantryAxumState<R, P>>,
                      ResolvedTenant(tenant): ResolvedTenant,
                      headers: HeaderMap,
                      Query(query): QueryParams,
                      OriginalUri(uri): OriginalUri,
                      Path(path): PathParams,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let svc = allowed_service(&state, &service_name, ServiceMethodKind::Patch)?;
                    let id = path_id(&path)?;
                    let Json(data) = data.map_err(map_json_rejection)?;
                    let params = rest_params::<P>(&headers, query, "PATCH", &uri);

                    let res = svc.patch(tenant, &id, data, params).await?;
                    Ok::<_, TenantryAxumError>(Json(res))
                }
            })
            .delete({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<TenantryAxumState<R, P>>,
                      ResolvedTenant(tenant): ResolvedTenant,
                      headers: HeaderMap,
                      Query(query): QueryParams,
                      OriginalUri(uri): OriginalUri,
                      Path(path): PathParams| async move {
                    let svc = allowed_service(&state, &service_name, ServiceMethodKind::Remove)?;
                    let id = path_id(&path)?;
                    let params = rest_params::<P>(&headers, query, "DELETE", &uri);

                    svc.remove(tenant, &id, params).await?;
                    Ok::<_, TenantryAxumError>(StatusCode::OK)
                }
            }),
        )
        .with_state(state)
}
