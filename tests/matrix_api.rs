use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use costadmin::api::routes::create_router;
use costadmin::store::MemoryStore;

fn test_app() -> Router {
    create_router::<MemoryStore>().with_state(Arc::new(MemoryStore::new()))
}

async fn request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
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

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    request(app, Method::GET, path, None).await
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::POST, path, Some(body)).await
}

async fn patch(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::PATCH, path, Some(body)).await
}

async fn delete(app: &Router, path: &str) -> (StatusCode, Value) {
    request(app, Method::DELETE, path, None).await
}

fn combination(project_type: &str, style: &str, spec: &str, price: &str, furniture: &str) -> Value {
    json!({
        "project_type": project_type,
        "style_preference": style,
        "project_specification": spec,
        "price_per_sqft": price,
        "furniture_included_price_per_sqft": furniture,
    })
}

#[tokio::test]
async fn health_check_responds() {
    let app = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn manual_combination_lifecycle() {
    let app = test_app();

    let (status, body) = post(
        &app,
        "/cost-estimations",
        combination("Villa", "Modern", "Basic", "10", "15"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["cost_estimation_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["price_per_sqft"], "10");

    // Duplicate triple is rejected by the pre-check, no row created.
    let (status, body) = post(
        &app,
        "/cost-estimations",
        combination("Villa", "Modern", "Basic", "11", "16"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    let (status, body) = get(&app, "/cost-estimations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Price edit touches only the supplied field.
    let (status, body) = patch(
        &app,
        &format!("/cost-estimations/{}", id),
        json!({"price_per_sqft": "12.50"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price_per_sqft"], "12.50");
    assert_eq!(body["data"]["furniture_included_price_per_sqft"], "15");

    // Malformed and non-positive prices fail closed.
    for bad in ["0", "-5", "abc", ""] {
        let (status, _) = patch(
            &app,
            &format!("/cost-estimations/{}", id),
            json!({"price_per_sqft": bad}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "price {:?}", bad);
    }

    let (status, _) = delete(&app, &format!("/cost-estimations/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, &format!("/cost-estimations/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_dimension_value_preview_and_submit() {
    let app = test_app();
    post(
        &app,
        "/cost-estimations",
        combination("Villa", "Modern", "Basic", "10", "15"),
    )
    .await;

    // One existing row, so adding Classic yields exactly one pending cell.
    let (status, body) = post(
        &app,
        "/cost-estimations/dimensions/style_preference/values",
        json!({"value": "Classic"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["project_type"], "Villa");
    assert_eq!(body["data"][0]["style_preference"], "Classic");
    assert_eq!(body["data"][0]["project_specification"], "Basic");

    let (status, body) = post(
        &app,
        "/cost-estimations/dimensions/style_preference/values/submit",
        json!({"combinations": [combination("Villa", "Classic", "Basic", "20", "25")]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 1);

    let (_, body) = get(&app, "/cost-estimations/dimensions").await;
    assert_eq!(body["data"]["style_preferences"], json!(["Modern", "Classic"]));

    let (_, body) = get(&app, "/cost-estimations").await;
    assert_eq!(body["count"], 2);

    // Duplicate dimension value is a validation error.
    let (status, _) = post(
        &app,
        "/cost-estimations/dimensions/style_preference/values",
        json!({"value": "Classic"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Empty matrix in another store: no combinations to create.
    let empty = test_app();
    let (status, body) = post(
        &empty,
        "/cost-estimations/dimensions/project_type/values",
        json!({"value": "Villa"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "No new combinations would be created");
}

#[tokio::test]
async fn rename_and_delete_dimension_values() {
    let app = test_app();
    for (p, s) in [("A", "X"), ("A", "Y"), ("B", "X")] {
        post(&app, "/cost-estimations", combination(p, s, "1", "10", "15")).await;
    }

    // Merge rename is rejected.
    let (status, _) = patch(
        &app,
        "/cost-estimations/dimensions/project_type/values/A",
        json!({"new_value": "B"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = patch(
        &app,
        "/cost-estimations/dimensions/project_type/values/A",
        json!({"new_value": "C"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["affected"], 2);

    let (_, body) = get(&app, "/cost-estimations/dimensions").await;
    assert_eq!(body["data"]["project_types"], json!(["C", "B"]));

    // Deleting C removes its two rows; B keeps the dimension alive.
    let (status, body) = delete(&app, "/cost-estimations/dimensions/project_type/values/C").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], 2);
    assert_eq!(body["data"]["matched"], 2);

    let (_, body) = get(&app, "/cost-estimations").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["project_type"], "B");

    // Last remaining value cannot be deleted.
    let (status, body) = delete(&app, "/cost-estimations/dimensions/project_type/values/B").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Cannot delete the last project type");
}

#[tokio::test]
async fn unknown_dimension_and_kind_are_bad_requests() {
    let app = test_app();
    let (status, _) = post(
        &app,
        "/cost-estimations/dimensions/color/values",
        json!({"value": "Red"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/master/colors").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn master_data_crud() {
    let app = test_app();

    let (status, body) = post(&app, "/master/departments", json!({"name": "Design"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Duplicate name hits the uniqueness guard.
    let (status, _) = post(&app, "/master/departments", json!({"name": "Design"})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Empty name fails closed.
    let (status, _) = post(&app, "/master/departments", json!({"name": "  "})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = get(&app, "/master/departments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = patch(
        &app,
        &format!("/master/departments/{}", id),
        json!({"name": "Engineering"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Engineering");

    let (status, _) = delete(&app, &format!("/master/departments/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = get(&app, "/master/departments").await;
    assert_eq!(body["count"], 0);
}
