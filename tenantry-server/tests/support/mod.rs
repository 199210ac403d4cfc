#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub async fn router() -> Router {
    tenantry_server::build().await.unwrap().into_router()
}

/// Send one request; the body is parsed as JSON, or `Value::Null` when empty.
pub async fn send(router: &Router, method: &str, uri: &str, host: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri).header("host", host);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn get(router: &Router, uri: &str, host: &str) -> (StatusCode, Value) {
    send(router, "GET", uri, host, None).await
}

pub async fn post(router: &Router, uri: &str, host: &str, body: Value) -> (StatusCode, Value) {
    send(router, "POST", uri, host, Some(body)).await
}

pub async fn put(router: &Router, uri: &str, host: &str, body: Value) -> (StatusCode, Value) {
    send(router, "PUT", uri, host, Some(body)).await
}

pub async fn patch(router: &Router, uri: &str, host: &str, body: Value) -> (StatusCode, Value) {
    send(router, "PATCH", uri, host, Some(body)).await
}

pub async fn delete(router: &Router, uri: &str, host: &str) -> (StatusCode, Value) {
    send(router, "DELETE", uri, host, None).await
}

/// Register a tenant with `host` as its primary domain; returns the client id.
pub async fn create_tenant(router: &Router, schema: &str, host: &str) -> i64 {
    let (status, client) = post(
        router,
        "/clients",
        "admin.localhost",
        json!({"name": schema.to_uppercase(), "schema_name": schema}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "client {schema}: {client}");
    let id = client["id"].as_i64().unwrap();

    let (status, domain) = post(
        router,
        "/domains",
        "admin.localhost",
        json!({"domain": host, "tenant_id": id, "is_primary": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "domain {host}: {domain}");
    id
}

pub fn ids(rows: &Value) -> Vec<i64> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}
