//! API Integration Tests
//!
//! Drive the router end to end over a temp-file store.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

mod common;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn rajesh() -> Value {
    json!({
        "consumerID": 1001,
        "name": "Rajesh Kumar",
        "address": "MG Road, Bangalore",
        "mobile_no": "9876543210"
    })
}

fn bill(consumer_id: i64, year: i32, month: i32, units: f64) -> Value {
    json!({
        "consumerID": consumer_id,
        "month": month,
        "year": year,
        "units_consumed": units
    })
}

#[tokio::test]
async fn consumer_create_then_get_round_trips() {
    let app = common::test_app();

    let (status, created) = send(&app, "POST", "/consumer", Some(rajesh())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, rajesh());

    let (status, fetched) = send(&app, "GET", "/consumer/1001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, rajesh());
}

#[tokio::test]
async fn duplicate_consumer_conflicts_and_leaves_store_unchanged() {
    let app = common::test_app();

    let (status, _) = send(&app, "POST", "/consumer", Some(rajesh())).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut other = rajesh();
    other["name"] = json!("Someone Else");
    let (status, body) = send(&app, "POST", "/consumer", Some(other)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Consumer already exists");

    let (_, state) = send(&app, "GET", "/state", None).await;
    assert_eq!(state["consumers"].as_array().unwrap().len(), 1);
    assert_eq!(state["consumers"][0]["name"], "Rajesh Kumar");
}

#[tokio::test]
async fn consumer_validation_failures_are_400() {
    let app = common::test_app();

    let cases = vec![
        json!({"consumerID": 0, "name": "Rajesh Kumar", "address": "MG Road, Bangalore", "mobile_no": "9876543210"}),
        json!({"consumerID": 1001, "name": "   ", "address": "MG Road, Bangalore", "mobile_no": "9876543210"}),
        json!({"consumerID": 1001, "name": "Rajesh Kumar", "address": "short", "mobile_no": "9876543210"}),
        json!({"consumerID": 1001, "name": "Rajesh Kumar", "address": "MG Road, Bangalore", "mobile_no": "98765"}),
    ];

    for body in cases {
        let (status, response) = send(&app, "POST", "/consumer", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert!(response["error"].is_string());
    }

    let (_, state) = send(&app, "GET", "/state", None).await;
    assert!(state["consumers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_consumer_is_404() {
    let app = common::test_app();

    let (status, body) = send(&app, "GET", "/consumer/4242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn bill_for_unknown_consumer_is_404() {
    let app = common::test_app();

    let (status, body) = send(&app, "POST", "/bill", Some(bill(999, 2024, 1, 100.0))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Consumer not found");
}

#[tokio::test]
async fn bill_validation_failures_are_400() {
    let app = common::test_app();
    send(&app, "POST", "/consumer", Some(rajesh())).await;

    let cases = vec![
        bill(1001, 2024, 0, 100.0),
        bill(1001, 2024, 13, 100.0),
        bill(1001, 1999, 1, 100.0),
        bill(1001, 2024, 1, 0.0),
        bill(1001, 2024, 1, -50.0),
    ];

    for body in cases {
        let (status, _) = send(&app, "POST", "/bill", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
    }
}

#[tokio::test]
async fn duplicate_bill_conflicts_without_touching_the_first() {
    let app = common::test_app();
    send(&app, "POST", "/consumer", Some(rajesh())).await;

    let (status, created) = send(&app, "POST", "/bill", Some(bill(1001, 2024, 1, 100.0))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["amt"], 500.0);

    let (status, body) = send(&app, "POST", "/bill", Some(bill(1001, 2024, 1, 999.0))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Bill already exists for month/year");

    let (status, stored) = send(&app, "GET", "/bill/1001/2024/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["units_consumed"], 100.0);
    assert_eq!(stored["amt"], 500.0);
}

#[tokio::test]
async fn amount_uses_rate_in_effect_at_creation_time() {
    let app = common::test_app();
    send(&app, "POST", "/consumer", Some(rajesh())).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/settings/cost-per-unit",
        Some(json!({"value": 6.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cost_per_unit"], 6.0);

    let (_, first) = send(&app, "POST", "/bill", Some(bill(1001, 2024, 1, 100.0))).await;
    assert_eq!(first["amt"], 600.0);

    // Raising the rate later must not rewrite the stored amount.
    send(
        &app,
        "PUT",
        "/settings/cost-per-unit",
        Some(json!({"value": 8.0})),
    )
    .await;

    let (_, stored) = send(&app, "GET", "/bill/1001/2024/1", None).await;
    assert_eq!(stored["amt"], 600.0);

    let (_, second) = send(&app, "POST", "/bill", Some(bill(1001, 2024, 2, 100.0))).await;
    assert_eq!(second["amt"], 800.0);
}

#[tokio::test]
async fn previous_bills_worked_example() {
    let app = common::test_app();
    send(&app, "POST", "/consumer", Some(rajesh())).await;

    // Default rate 5.0: 100/150/200 units -> 500/750/1000.
    for (month, units) in [(1, 100.0), (2, 150.0), (3, 200.0)] {
        let (status, _) = send(&app, "POST", "/bill", Some(bill(1001, 2024, month, units))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, previous) = send(&app, "GET", "/bills/previous/1001/2024/3", None).await;
    assert_eq!(status, StatusCode::OK);
    let previous = previous.as_array().unwrap().clone();
    assert_eq!(previous.len(), 2);
    assert_eq!(previous[0]["year"], 2024);
    assert_eq!(previous[0]["month"], 2);
    assert_eq!(previous[0]["amt"], 750.0);
    assert_eq!(previous[1]["year"], 2024);
    assert_eq!(previous[1]["month"], 1);
    assert_eq!(previous[1]["amt"], 500.0);
}

#[tokio::test]
async fn previous_bills_caps_at_three_and_excludes_target() {
    let app = common::test_app();
    send(&app, "POST", "/consumer", Some(rajesh())).await;

    for month in 1..=5 {
        send(&app, "POST", "/bill", Some(bill(1001, 2024, month, 100.0))).await;
    }

    let (_, previous) = send(&app, "GET", "/bills/previous/1001/2024/5", None).await;
    let months: Vec<i64> = previous
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["month"].as_i64().unwrap())
        .collect();
    assert_eq!(months, vec![4, 3, 2]);
}

#[tokio::test]
async fn consumer_delete_cascades_to_bills() {
    let app = common::test_app();
    send(&app, "POST", "/consumer", Some(rajesh())).await;
    for month in 1..=3 {
        send(&app, "POST", "/bill", Some(bill(1001, 2024, month, 100.0))).await;
    }

    let (status, body) = send(&app, "DELETE", "/consumer/1001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, state) = send(&app, "GET", "/state", None).await;
    assert!(state["consumers"].as_array().unwrap().is_empty());
    assert!(state["bills"].as_array().unwrap().is_empty());

    let (status, previous) = send(&app, "GET", "/bills/previous/1001/2024/12", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(previous.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deletes_are_idempotent() {
    let app = common::test_app();

    let (status, body) = send(&app, "DELETE", "/consumer/4242", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = send(&app, "DELETE", "/bill/4242/2024/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn bill_get_and_delete_by_period() {
    let app = common::test_app();
    send(&app, "POST", "/consumer", Some(rajesh())).await;
    send(&app, "POST", "/bill", Some(bill(1001, 2024, 3, 200.0))).await;

    let (status, fetched) = send(&app, "GET", "/bill/1001/2024/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["units_consumed"], 200.0);

    let (status, _) = send(&app, "DELETE", "/bill/1001/2024/3", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/bill/1001/2024/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_positive_rate_is_rejected_and_unchanged() {
    let app = common::test_app();

    for body in [json!({"value": 0}), json!({"value": -3.5}), json!({})] {
        let (status, _) = send(&app, "PATCH", "/settings/cost-per-unit", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = send(&app, "GET", "/settings/cost-per-unit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cost_per_unit"], 5.0);
}

#[tokio::test]
async fn settings_accepts_legacy_cpu_alias() {
    let app = common::test_app();

    let (status, body) = send(
        &app,
        "PATCH",
        "/settings/cost-per-unit",
        Some(json!({"cpu": 9.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cost_per_unit"], 9.0);

    let (_, body) = send(&app, "GET", "/settings/cost-per-unit", None).await;
    assert_eq!(body["cost_per_unit"], 9.0);
}

#[tokio::test]
async fn state_snapshot_reflects_all_mutations() {
    let app = common::test_app();

    let (_, initial) = send(&app, "GET", "/state", None).await;
    assert!(initial["consumers"].as_array().unwrap().is_empty());
    assert!(initial["bills"].as_array().unwrap().is_empty());
    assert_eq!(initial["cost_per_unit"], 5.0);

    send(&app, "POST", "/consumer", Some(rajesh())).await;
    send(&app, "POST", "/bill", Some(bill(1001, 2024, 1, 100.0))).await;
    send(
        &app,
        "PUT",
        "/settings/cost-per-unit",
        Some(json!({"value": 7.5})),
    )
    .await;

    let (_, state) = send(&app, "GET", "/state", None).await;
    assert_eq!(state["consumers"].as_array().unwrap().len(), 1);
    assert_eq!(state["bills"].as_array().unwrap().len(), 1);
    assert_eq!(state["cost_per_unit"], 7.5);
}
