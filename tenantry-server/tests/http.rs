mod support;

use axum::http::StatusCode;
use serde_json::{json, Value};

use support::{create_tenant, delete, get, patch, post, put, router, send};

const ACME: &str = "acme.localhost";

#[tokio::test]
async fn health_ok() {
    let r = router().await;
    let (status, body) = get(&r, "/health", "anything").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let r = router().await;
    let res = r
        .oneshot(Request::builder().uri("/clients").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(res.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn clients_registry_lifecycle() {
    let r = router().await;
    let id = create_tenant(&r, "acme", ACME).await;

    let (status, list) = get(&r, "/clients", "whatever.host").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["schema_name"], "acme");
    assert_eq!(list[0]["name"], "ACME");
    assert!(list[0]["created_on"].is_string());

    let (status, one) = get(&r, &format!("/clients/{id}"), "whatever.host").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["id"], id);

    let (status, body) = delete(&r, &format!("/clients/{id}"), "whatever.host").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, _) = get(&r, &format!("/clients/{id}"), "whatever.host").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Its domains went with it, so the host no longer resolves.
    let (_, domains) = get(&r, "/domains", "whatever.host").await;
    assert_eq!(domains, json!([]));
    let (status, body) = get(&r, "/members", ACME).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No tenant for hostname.");
}

#[tokio::test]
async fn clients_reject_bad_and_duplicate_schema_names() {
    let r = router().await;

    let (status, body) = post(&r, "/clients", "x", json!({"name": "Bad", "schema_name": "pg_bad"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["schema_name"].is_array());

    let (status, body) = post(&r, "/clients", "x", json!({"schema_name": "acme"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "is required");

    create_tenant(&r, "acme", ACME).await;
    let (status, body) = post(&r, "/clients", "x", json!({"name": "Again", "schema_name": "acme"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["name"], "Conflict");
}

#[tokio::test]
async fn clients_cannot_be_edited_in_place() {
    let r = router().await;
    let id = create_tenant(&r, "acme", ACME).await;

    let (status, body) = put(&r, &format!("/clients/{id}"), "x", json!({"name": "New"})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["name"], "MethodNotAllowed");
}

#[tokio::test]
async fn clients_search_matches_name_and_schema() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;
    create_tenant(&r, "globex", "globex.localhost").await;

    let (_, hits) = get(&r, "/clients?search=GLOB", "x").await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["schema_name"], "globex");

    let (_, hits) = get(&r, "/clients?search=", "x").await;
    assert_eq!(hits.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn domains_enforce_registry_rules() {
    let r = router().await;
    let acme = create_tenant(&r, "acme", ACME).await;

    let (status, body) = post(&r, "/domains", "x", json!({"domain": "ghost.localhost", "tenant_id": 9999})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["tenant_id"][0], "tenant not found");

    let (status, _) = post(&r, "/domains", "x", json!({"domain": "ACME.localhost", "tenant_id": acme})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = post(
        &r,
        "/domains",
        "x",
        json!({"domain": "www.acme.localhost", "tenant_id": acme, "is_primary": true}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"]["tenant_id"][0], "tenant already has a primary domain");

    let (status, alias) = post(&r, "/domains", "x", json!({"domain": "WWW.Acme.localhost:8000", "tenant_id": acme})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alias["domain"], "www.acme.localhost");
    assert_eq!(alias["is_primary"], false);

    let (status, body) = post(&r, "/domains", "x", json!({"domain": "bad host", "tenant_id": acme})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["domain"][0], "must be a valid hostname");
}

#[tokio::test]
async fn domains_filter_by_primary_and_search() {
    let r = router().await;
    let acme = create_tenant(&r, "acme", ACME).await;
    post(&r, "/domains", "x", json!({"domain": "alias.acme.test", "tenant_id": acme})).await;

    let (_, primary) = get(&r, "/domains?is_primary=true", "x").await;
    assert_eq!(primary.as_array().unwrap().len(), 1);
    assert_eq!(primary[0]["domain"], ACME);

    let (_, aliases) = get(&r, "/domains?is_primary=false&search=acme.test", "x").await;
    assert_eq!(aliases.as_array().unwrap().len(), 1);
    assert_eq!(aliases[0]["tenant_id"], acme);

    let (status, body) = get(&r, "/domains?is_primary=maybe", "x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["is_primary"].is_array());
}

#[tokio::test]
async fn domain_alias_resolves_and_delete_unmaps_it() {
    let r = router().await;
    let acme = create_tenant(&r, "acme", ACME).await;
    let (_, alias) = post(&r, "/domains", "x", json!({"domain": "alias.acme.test", "tenant_id": acme})).await;

    post(&r, "/members", "alias.acme.test", json!({"name": "Ada"})).await;
    let (_, via_primary) = get(&r, "/members", ACME).await;
    assert_eq!(via_primary[0]["name"], "Ada");

    let (status, _) = delete(&r, &format!("/domains/{}", alias["id"]), "x").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&r, "/members", "alias.acme.test").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn member_create_round_trip() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;

    let (status, created) = post(&r, "/members", ACME, json!({"name": "Ada", "email": "ada@acme.test"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(created["id"].is_i64());
    assert!(created["created_at"].is_string());
    assert_eq!(created["phone"], Value::Null);

    let (status, fetched) = get(&r, &format!("/members/{}", created["id"]), ACME).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn member_create_requires_name() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;

    let (status, body) = post(&r, "/members", ACME, json!({"email": "x@y.z"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "is required");
    assert_eq!(body["className"], "unprocessable");

    let (status, body) = post(&r, "/members", ACME, json!({"name": null})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "is required");

    let (status, body) = post(&r, "/members", ACME, json!({"name": 5})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["name"][0].as_str().unwrap().contains("expected a string"));
    assert!(body["errors"].get("_schema").is_none());

    let (_, list) = get(&r, "/members", ACME).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn member_update_only_overwrites_present_fields() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;
    let (_, m) = post(
        &r,
        "/members",
        ACME,
        json!({"name": "Ada", "email": "ada@acme.test", "phone": "555-0100"}),
    )
    .await;
    let uri = format!("/members/{}", m["id"]);

    let (status, updated) = put(&r, &uri, ACME, json!({"name": "Ada L.", "phone": null})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ada L.");
    assert_eq!(updated["email"], "ada@acme.test");
    assert_eq!(updated["phone"], "555-0100");
    assert_eq!(updated["created_at"], m["created_at"]);

    let (status, body) = put(&r, &uri, ACME, json!({"email": "new@acme.test"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "is required");

    let (status, patched) = patch(&r, &uri, ACME, json!({"email": "new@acme.test"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "Ada L.");
    assert_eq!(patched["email"], "new@acme.test");
}

#[tokio::test]
async fn member_delete_is_not_found_afterwards() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;
    let (_, m) = post(&r, "/members", ACME, json!({"name": "Ada"})).await;
    let (_, keep) = post(&r, "/members", ACME, json!({"name": "Grace"})).await;
    let uri = format!("/members/{}", m["id"]);

    let (status, body) = delete(&r, &uri, ACME).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    for _ in 0..2 {
        let (status, body) = delete(&r, &uri, ACME).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Object not found.");
    }

    let (_, list) = get(&r, "/members", ACME).await;
    assert_eq!(support::ids(&list), vec![keep["id"].as_i64().unwrap()]);
}

#[tokio::test]
async fn missing_and_malformed_ids_are_not_found() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;

    for uri in ["/members/424242", "/members/abc"] {
        let (status, body) = get(&r, uri, ACME).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Object not found.");
        assert_eq!(body["name"], "NotFound");
        assert_eq!(body["code"], 404);
    }

    let (status, _) = put(&r, "/members/424242", ACME, json!({"name": "X"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let r = router().await;
    create_tenant(&r, "acme", ACME).await;

    let res = r
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/members")
                .header("host", ACME)
                .header("content-type", "application/json")
                .body(Body::from("{\"name\":"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn members_search_covers_name_email_and_phone() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;
    post(&r, "/members", ACME, json!({"name": "Ada", "email": "ada@acme.test"})).await;
    post(&r, "/members", ACME, json!({"name": "Grace", "phone": "555-0199"})).await;

    let (_, by_email) = get(&r, "/members?search=ADA@", ACME).await;
    assert_eq!(by_email.as_array().unwrap().len(), 1);

    let (_, by_phone) = get(&r, "/members?search=0199", ACME).await;
    assert_eq!(by_phone[0]["name"], "Grace");

    let (_, none) = get(&r, "/members?search=zzz", ACME).await;
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn items_crud() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;

    let (status, item) = post(&r, "/items", ACME, json!({"name": "Desk", "description": "oak"})).await;
    assert_eq!(status, StatusCode::OK);
    let uri = format!("/items/{}", item["id"]);

    let (_, updated) = put(&r, &uri, ACME, json!({"name": "Standing desk"})).await;
    assert_eq!(updated["description"], "oak");

    let (_, list) = get(&r, "/items", ACME).await;
    assert_eq!(list[0]["name"], "Standing desk");

    let (status, _) = delete(&r, &uri, ACME).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&r, &uri, ACME).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_host_never_reaches_tenant_data() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;

    for (method, uri) in [("GET", "/members"), ("GET", "/items/1"), ("DELETE", "/region/1")] {
        let (status, body) = send(&r, method, uri, "nobody.localhost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["detail"], "No tenant for hostname.");
    }
}

#[tokio::test]
async fn path_selector_picks_the_tenant() {
    let r = router().await;
    create_tenant(&r, "acme", ACME).await;

    let (status, m) = post(&r, "/client/acme.localhost/members", "nobody.localhost", json!({"name": "Ada"})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, via_host) = get(&r, &format!("/members/{}", m["id"]), ACME).await;
    assert_eq!(via_host["name"], "Ada");

    let (status, body) = get(&r, "/client/ghost.localhost/members", ACME).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No tenant for hostname.");
}
