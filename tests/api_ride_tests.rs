// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end ride flow over HTTP.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

mod common;
use common::{create_test_app, create_test_jwt, DESTINATION, PICKUP};

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn ride_body(category: &str) -> Value {
    json!({
        "pickup": { "address": "Kenyatta Avenue", "lat": PICKUP.lat, "lng": PICKUP.lng },
        "destination": { "address": "Westlands", "lat": DESTINATION.lat, "lng": DESTINATION.lng },
        "category": category,
        "paymentMethod": "mobile_money",
    })
}

#[tokio::test]
async fn test_fare_estimate() {
    let (app, state) = create_test_app();
    let token = create_test_jwt(Uuid::new_v4(), false, &state);

    let (status, json) = send(
        &app,
        Method::POST,
        "/rides/fare-estimate",
        &token,
        Some(json!({
            "pickup": { "lat": PICKUP.lat, "lng": PICKUP.lng },
            "destination": { "lat": DESTINATION.lat, "lng": DESTINATION.lng },
            "category": "economy",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let total = json["totalFare"].as_f64().unwrap();
    assert!(total > 0.0);
    assert_eq!(total % 5.0, 0.0);
    assert_eq!(json["approximate"], false);
    assert_eq!(json["breakdown"]["totalFare"], json["totalFare"]);
}

#[tokio::test]
async fn test_fare_estimate_rejects_bad_coordinates() {
    let (app, state) = create_test_app();
    let token = create_test_jwt(Uuid::new_v4(), false, &state);

    let (status, json) = send(
        &app,
        Method::POST,
        "/rides/fare-estimate",
        &token,
        Some(json!({
            "pickup": { "lat": 95.0, "lng": PICKUP.lng },
            "destination": { "lat": DESTINATION.lat, "lng": DESTINATION.lng },
            "category": "economy",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_second_request_conflicts() {
    let (app, state) = create_test_app();
    let token = create_test_jwt(Uuid::new_v4(), false, &state);

    let (status, first) = send(
        &app,
        Method::POST,
        "/rides/request",
        &token,
        Some(ride_body("economy")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "pending");

    let (status, json) = send(
        &app,
        Method::POST,
        "/rides/request",
        &token,
        Some(ride_body("comfort")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "active_ride_exists");

    let (status, active) = send(&app, Method::GET, "/rides/active", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["ride"]["id"], first["id"]);
}

#[tokio::test]
async fn test_unknown_ride_is_not_found() {
    let (app, state) = create_test_app();
    let token = create_test_jwt(Uuid::new_v4(), false, &state);

    let uri = format!("/rides/{}", Uuid::new_v4());
    let (status, json) = send(&app, Method::GET, &uri, &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let (app, state) = create_test_app();
    let rider = create_test_jwt(Uuid::new_v4(), false, &state);
    let driver = create_test_jwt(Uuid::new_v4(), false, &state);
    let admin = create_test_jwt(Uuid::new_v4(), true, &state);

    // Onboard the driver
    let (status, profile) = send(
        &app,
        Method::POST,
        "/drivers/apply",
        &driver,
        Some(json!({ "documents": { "license": "uploads/license.pdf" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(profile["status"], "pending");
    let driver_id = profile["id"].as_str().unwrap().to_string();

    // Unapproved drivers cannot go online
    let (status, json) = send(
        &app,
        Method::PUT,
        "/drivers/me/availability",
        &driver,
        Some(json!({ "availability": "online" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "driver_not_approved");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/admin/drivers/{}/verification", driver_id),
        &admin,
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, vehicle) = send(
        &app,
        Method::POST,
        "/drivers/me/vehicles",
        &driver,
        Some(json!({
            "category": "economy",
            "type": "sedan",
            "plate": "KDA 123B",
            "make": "Toyota",
            "model": "Axio",
            "capacity": 4,
            "fuelType": "petrol",
            "condition": "good",
            "imageUrl": "uploads/axio.jpg",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = vehicle["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::PUT,
        "/drivers/me/location",
        &driver,
        Some(json!({ "lat": PICKUP.lat, "lng": PICKUP.lng })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(
        &app,
        Method::PUT,
        "/drivers/me/availability",
        &driver,
        Some(json!({ "availability": "online" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["availability"], "online");

    // Rider requests, driver accepts
    let (status, ride) = send(
        &app,
        Method::POST,
        "/rides/request",
        &rider,
        Some(ride_body("economy")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ride_id = ride["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        Method::PATCH,
        &format!("/rides/{}/start", ride_id),
        &driver,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "invalid_transition");

    let (status, accepted) = send(
        &app,
        Method::PATCH,
        &format!("/rides/{}/accept", ride_id),
        &driver,
        Some(json!({ "vehicleId": vehicle_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");
    assert_eq!(accepted["driverId"], driver_id.as_str());

    // Vehicle in use cannot be parked
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/drivers/me/vehicles/{}/active", vehicle_id),
        &driver,
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, started) = send(
        &app,
        Method::PATCH,
        &format!("/rides/{}/start", ride_id),
        &driver,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "in_progress");

    let (status, done) = send(
        &app,
        Method::PATCH,
        &format!("/rides/{}/complete", ride_id),
        &driver,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "completed");
    assert!(done["fare"].as_f64().unwrap() > 0.0);
    assert!(done["systemCommission"].as_f64().unwrap() > 0.0);

    // Both parties are free again
    let (_, active) = send(&app, Method::GET, "/rides/active", &rider, None).await;
    assert!(active["ride"].is_null());
    let (_, me) = send(&app, Method::GET, "/drivers/me", &driver, None).await;
    assert_eq!(me["driver"]["availability"], "online");
    assert_eq!(me["driver"]["totalRides"], 1);
    assert_eq!(me["vehicles"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rider_cancel_without_body() {
    let (app, state) = create_test_app();
    let token = create_test_jwt(Uuid::new_v4(), false, &state);

    let (_, ride) = send(
        &app,
        Method::POST,
        "/rides/request",
        &token,
        Some(ride_body("economy")),
    )
    .await;
    let uri = format!("/rides/{}/cancel", ride["id"].as_str().unwrap());

    let (status, cancelled) = send(&app, Method::PATCH, &uri, &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancellation"]["by"], "rider");

    let other = create_test_jwt(Uuid::new_v4(), false, &state);
    let (status, _) = send(&app, Method::PATCH, &uri, &other, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_pricing_update_bumps_version() {
    let (app, state) = create_test_app();
    let admin = create_test_jwt(Uuid::new_v4(), true, &state);

    let (status, mut config) = send(&app, Method::GET, "/admin/pricing", &admin, None).await;
    assert_eq!(status, StatusCode::OK);
    let version = config["version"].as_u64().unwrap();

    config["baseFare"] = json!(150.0);
    let (status, updated) = send(
        &app,
        Method::PUT,
        "/admin/pricing",
        &admin,
        Some(config.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["version"].as_u64().unwrap(), version + 1);
    assert_eq!(updated["baseFare"], 150.0);
    assert_eq!(state.pricing.current().unwrap().base_fare, 150.0);

    config["baseFare"] = json!(-1.0);
    let (status, _) = send(&app, Method::PUT, "/admin/pricing", &admin, Some(config)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
