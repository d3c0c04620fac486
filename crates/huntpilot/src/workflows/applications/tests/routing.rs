use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::applications::TrackerService;

fn application_payload(company: &str, status: &str, date_applied: &str) -> Value {
    serde_json::to_value(application_form(company, status, date_applied)).expect("form serializes")
}

async fn create(router: &axum::Router, company: &str, status: &str, date_applied: &str) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/applications",
            &application_payload(company, status, date_applied),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    payload["id"].as_str().expect("id present").to_string()
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    for header in [None, Some("   ")] {
        let mut request = Request::builder().uri("/api/v1/follow-ups");
        if let Some(value) = header {
            request = request.header("x-user-id", value);
        }
        let response = router
            .clone()
            .oneshot(request.body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn create_route_returns_field_errors() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/applications",
            &json!({ "company": "Acme", "status": "APPLIED" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], "Please fix the highlighted fields.");
    assert_eq!(payload["errors"]["role"][0], "Role is required");
    assert!(payload["errors"].get("company").is_none());
}

#[tokio::test]
async fn detail_route_reports_follow_up_urgency() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, "Acme", "OA", "2024-03-01").await;

    let response = router
        .oneshot(get_request(&format!(
            "/api/v1/applications/{id}?today=2024-03-06"
        )))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["application"]["status"], "OA");
    assert_eq!(payload["follow_up"]["due_at"], "2024-03-04");
    assert_eq!(payload["follow_up"]["urgency"]["kind"], "overdue");
    assert_eq!(payload["follow_up"]["urgency"]["days_past"], 2);
    assert_eq!(payload["follow_up"]["label"], "Overdue by 2 days");
}

#[tokio::test]
async fn follow_up_queue_route_uses_today_parameter() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    create(&router, "Acme", "APPLIED", "2024-03-01").await;
    create(&router, "Globex", "REJECTED", "2024-03-01").await;

    let response = router
        .clone()
        .oneshot(get_request("/api/v1/follow-ups?today=2024-03-08"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let entries = payload.as_array().expect("queue is a list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["company"], "Acme");
    assert_eq!(entries[0]["urgency"]["kind"], "due");
    assert_eq!(entries[0]["urgency_label"], "Due today");

    let response = router
        .oneshot(get_request("/api/v1/follow-ups?today=tomorrow"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn activity_route_updates_status_and_list_filters() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, "Acme", "APPLIED", "2024-03-01").await;
    create(&router, "Globex", "APPLIED", "2024-03-02").await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applications/{id}/activities"),
            &json!({ "type": "OFFER", "occurred_at": "2024-03-20", "title": "Offer call" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(get_request("/api/v1/applications?status=OFFER,%20INTERVIEW"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("list payload");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], id.as_str());
    assert_eq!(rows[0]["status"], "OFFER");
}

#[tokio::test]
async fn complete_route_conflicts_for_rejected_and_missing_is_not_found() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, "Acme", "REJECTED", "2024-03-01").await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applications/{id}/follow-ups/complete?today=2024-03-09"),
            &json!({}),
        ))
        .await
        .expect("route executes");
    assert_conflict_response(response);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/applications/app-unknown/follow-ups/complete",
            &json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_route_returns_no_content_then_not_found() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, "Acme", "APPLIED", "2024-03-01").await;
    let uri = format!("/api/v1/applications/{id}");

    let response = router
        .clone()
        .oneshot(json_request("DELETE", &uri, &json!({})))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(get_request(&uri))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn round_and_checklist_routes_drive_the_schedule() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let id = create(&router, "Acme", "INTERVIEW", "2024-03-01").await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applications/{id}/rounds"),
            &json!({ "scheduled_at": "2024-03-12T10:00" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let round = read_json_body(response).await;
    let round_id = round["id"].as_str().expect("round id").to_string();
    assert_eq!(round["round_number"], 1);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applications/{id}/checklist"),
            &json!({ "round_id": round_id, "text": "Prepare questions" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = read_json_body(response).await;
    let item_id = item["id"].as_str().expect("item id");

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applications/{id}/checklist/{item_id}/toggle"),
            &json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(response).await["is_done"], true);

    let response = router
        .clone()
        .oneshot(get_request("/api/v1/interviews"))
        .await
        .expect("route executes");
    let schedule = read_json_body(response).await;
    assert_eq!(schedule["scheduled"][0]["progress"]["done"], 1);
    assert_eq!(schedule["scheduled"][0]["company"], "Acme");

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/rounds/{round_id}/outcome"),
            &json!({ "outcome": "FAILED" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(response).await["outcome"], "FAILED");

    let response = router
        .oneshot(get_request("/api/v1/interviews"))
        .await
        .expect("route executes");
    let schedule = read_json_body(response).await;
    assert_eq!(schedule["scheduled"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn template_routes_create_filter_and_delete() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/templates",
            &json!({ "status": "OFFER", "title": "Negotiation", "body": "Thanks for the offer." }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let template_id = read_json_body(response).await["id"]
        .as_str()
        .expect("template id")
        .to_string();

    let response = router
        .clone()
        .oneshot(get_request("/api/v1/templates?status=APPLIED"))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(response).await, json!([]));

    let response = router
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/v1/templates/{template_id}"),
            &json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(json_request(
            "DELETE",
            &format!("/api/v1/templates/{template_id}"),
            &json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repository_outage_maps_to_internal_error() {
    let service = Arc::new(TrackerService::new(Arc::new(UnavailableRepository)));
    let router = router_with_service(service);

    let response = router
        .oneshot(get_request("/api/v1/dashboard?today=2024-03-01"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn duplicate_create_maps_to_conflict() {
    let service = Arc::new(TrackerService::new(Arc::new(ConflictRepository)));
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/applications",
            &application_payload("Acme", "APPLIED", "2024-03-01"),
        ))
        .await
        .expect("route executes");

    assert_conflict_response(response);
}
