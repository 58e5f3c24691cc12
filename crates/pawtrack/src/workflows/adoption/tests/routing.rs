use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::adoption::router::{
    actor_from_headers, delete_contract_handler, StatusChangeRequest, ACTOR_ID_HEADER,
    ACTOR_ROLE_HEADER,
};
use crate::workflows::adoption::store::{EntityKind, MemoryStore};
use crate::workflows::adoption::{IdentityContext, Role};

fn request(method: &str, uri: &str, actor: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((role, id)) = actor {
        builder = builder
            .header(ACTOR_ROLE_HEADER, role)
            .header(ACTOR_ID_HEADER, id);
    }
    match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

fn animal_payload(name: &str) -> Value {
    json!({
        "name": name,
        "species": "cat",
        "photo_gallery": ["https://img.example/cat.jpg"],
        "good_with_cats": true
    })
}

#[test]
fn identity_headers_are_parsed_together() {
    let mut headers = HeaderMap::new();
    assert_eq!(actor_from_headers(&headers).ok(), Some(None));

    headers.insert(ACTOR_ROLE_HEADER, HeaderValue::from_static("Coordinator"));
    assert!(actor_from_headers(&headers).is_err());

    headers.insert(ACTOR_ID_HEADER, HeaderValue::from_static(" 7 "));
    let actor = actor_from_headers(&headers)
        .ok()
        .flatten()
        .expect("identity present");
    assert_eq!(actor.role(), Role::Admin);
    assert_eq!(actor, IdentityContext::from_claims("admin", 7));

    headers.insert(ACTOR_ID_HEADER, HeaderValue::from_static("seven"));
    assert!(actor_from_headers(&headers).is_err());
}

#[tokio::test]
async fn intake_route_allocates_identifier_and_joins_volunteer() {
    let (workflow, _) = build_workflow();
    let router = router_with_workflow(workflow);

    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/animals",
            Some(("foster", "2")),
            Some(animal_payload("Miso")),
        ))
        .await
        .expect("router response");

    assert_status(&response, StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["unique_id"], "SFP-001");
    assert_eq!(payload["status"], "draft");
    assert_eq!(payload["volunteer_id"], 2);
    assert_eq!(payload["volunteer"]["first_name"], "Finn");
    assert!(payload["volunteer"].get("credential").is_none());
}

#[tokio::test]
async fn anonymous_animal_listing_is_unauthorized() {
    let (workflow, _) = build_workflow();
    let router = router_with_workflow(workflow);

    let response = router
        .oneshot(request("GET", "/api/v1/animals", None, None))
        .await
        .expect("router response");

    assert_status(&response, StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("authentication required"));
}

#[tokio::test]
async fn foster_update_route_is_forbidden() {
    let (workflow, _) = build_workflow();
    workflow
        .intake_animal(Some(&foster()), intake("Biscuit"))
        .expect("intake");
    let router = router_with_workflow(workflow);

    let response = router
        .oneshot(request(
            "PUT",
            "/api/v1/animals/SFP-001",
            Some(("foster", "2")),
            Some(json!({ "status": "published" })),
        ))
        .await
        .expect("router response");

    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_status_route_is_unprocessable() {
    let (workflow, _) = build_workflow();
    workflow
        .intake_animal(Some(&admin()), intake("Biscuit"))
        .expect("intake");
    let router = router_with_workflow(workflow);

    let response = router
        .oneshot(request(
            "PATCH",
            "/api/v1/animals/SFP-001/status",
            Some(("admin", "1")),
            Some(json!({ "status": "missing" })),
        ))
        .await
        .expect("router response");

    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("draft, published, fostering, adopted"));
}

#[tokio::test]
async fn public_listing_route_needs_no_identity() {
    let (workflow, _) = build_workflow();
    let created = workflow
        .intake_animal(Some(&admin()), intake("Biscuit"))
        .expect("intake");
    workflow
        .change_animal_status(Some(&admin()), &created.animal.unique_id, "adopted")
        .expect("adopt");
    let router = router_with_workflow(workflow);

    let response = router
        .clone()
        .oneshot(request("GET", "/api/v1/animals/public?listing=adopted", None, None))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));

    let response = router
        .oneshot(request("GET", "/api/v1/animals/public", None, None))
        .await
        .expect("router response");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn application_route_reports_missing_animal() {
    let (workflow, _) = build_workflow();
    let router = router_with_workflow(workflow);

    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/applications",
            None,
            Some(json!({ "animal_id": "SFP-404", "applicant_id": 1, "answers": {} })),
        ))
        .await
        .expect("router response");

    assert_status(&response, StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "animal SFP-404 not found");
}

#[tokio::test]
async fn interview_routes_schedule_and_record_result() {
    let (workflow, _) = build_workflow();
    let animal = workflow
        .intake_animal(Some(&admin()), intake("Biscuit"))
        .expect("intake");
    let application = workflow
        .submit_application(None, submission(&animal.animal.unique_id))
        .expect("submission");
    let router = router_with_workflow(workflow);

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/interviews",
            Some(("adoption interviewer", "4")),
            Some(json!({
                "application_id": application.application.id,
                "volunteer_id": 4,
                "applicant_id": 1,
                "interview_time": "2026-11-03T15:30:00Z"
            })),
        ))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["volunteer_name"], "Ivy Stone");
    assert_eq!(payload["interview_result"], "pending");
    assert_eq!(payload["application"]["status"], "submitted");

    let response = router
        .oneshot(request(
            "PATCH",
            "/api/v1/interviews/1/result",
            Some(("interviewer", "4")),
            Some(json!({ "interview_result": "passed" })),
        ))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["interview_result"], "passed");
}

#[tokio::test]
async fn contract_delete_handler_then_lookup_is_not_found() {
    let (workflow, _) = build_workflow();
    let animal = workflow
        .intake_animal(Some(&admin()), intake("Biscuit"))
        .expect("intake");
    let contract = workflow
        .issue_contract(Some(&admin()), contract_request(&animal.animal.unique_id))
        .expect("issue");
    let workflow = Arc::new(workflow);

    let mut headers = HeaderMap::new();
    headers.insert(ACTOR_ROLE_HEADER, HeaderValue::from_static("admin"));
    headers.insert(ACTOR_ID_HEADER, HeaderValue::from_static("1"));

    let response = delete_contract_handler::<MemoryStore>(
        State(workflow.clone()),
        headers,
        Path(contract.contract.id.0),
    )
    .await;
    assert_status(&response, StatusCode::NO_CONTENT);

    let response = crate::workflows::adoption::adoption_router(workflow)
        .oneshot(request(
            "GET",
            &format!("/api/v1/contracts/{}", contract.contract.id),
            Some(("admin", "1")),
            None,
        ))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn animal_delete_returns_no_content_and_denies_fosters() {
    let (workflow, store) = build_workflow();
    let animal = workflow
        .intake_animal(Some(&admin()), intake("Biscuit"))
        .expect("intake");
    let uri = format!("/api/v1/animals/{}", animal.animal.unique_id);
    let router = router_with_workflow(workflow);

    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, Some(("foster", "2")), None))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::FORBIDDEN);

    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, Some(("admin", "1")), None))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::NO_CONTENT);
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("body");
    assert!(body.is_empty());
    assert_eq!(store.count(EntityKind::Animal).expect("count"), 0);

    let response = router
        .oneshot(request("DELETE", &uri, Some(("admin", "1")), None))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_identity_headers_are_rejected() {
    let (workflow, _) = build_workflow();
    let router = router_with_workflow(workflow);

    let response = router
        .oneshot(request(
            "GET",
            "/api/v1/contracts",
            Some(("admin", "first")),
            None,
        ))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_route_is_unavailable_when_store_is_down() {
    let router = crate::workflows::adoption::adoption_router(Arc::new(unavailable_workflow()));

    let body = serde_json::to_value(StatusChangeRequest {
        status: "approved".to_string(),
    })
    .expect("serialize");
    let response = router
        .oneshot(request(
            "PATCH",
            "/api/v1/applications/1/status",
            Some(("interviewer", "4")),
            Some(body),
        ))
        .await
        .expect("router response");
    assert_status(&response, StatusCode::SERVICE_UNAVAILABLE);
}
