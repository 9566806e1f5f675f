// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride routes: quotes, requests and lifecycle transitions.

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{FareQuote, Ride};
use crate::services::{FareEstimateRequest, RideRequest};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Ride routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides/fare-estimate", post(fare_estimate))
        .route("/rides/request", post(request_ride))
        .route("/rides/active", get(active_ride))
        .route("/rides/{id}", get(get_ride))
        .route("/rides/{id}/accept", patch(accept_ride))
        .route("/rides/{id}/start", patch(start_ride))
        .route("/rides/{id}/complete", patch(complete_ride))
        .route("/rides/{id}/cancel", patch(cancel_ride))
}

// ─── Rider ───────────────────────────────────────────────────

async fn fare_estimate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FareEstimateRequest>,
) -> Result<Json<FareQuote>> {
    Ok(Json(state.rides.estimate_fare(body).await?))
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<RideRequest>,
) -> Result<(StatusCode, Json<Ride>)> {
    let ride = state.rides.create(user.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(ride)))
}

#[derive(Serialize)]
pub struct ActiveRideResponse {
    pub ride: Option<Ride>,
}

async fn active_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<ActiveRideResponse> {
    Json(ActiveRideResponse {
        ride: state.rides.active_ride(user.user_id),
    })
}

async fn get_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<Ride>> {
    Ok(Json(
        state
            .rides
            .get_ride_for(user.user_id, ride_id, user.is_admin)?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelRideBody {
    reason: Option<String>,
}

async fn cancel_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(ride_id): Path<Uuid>,
    body: Option<Json<CancelRideBody>>,
) -> Result<Json<Ride>> {
    let reason = body.and_then(|Json(b)| b.reason);
    Ok(Json(state.rides.cancel(user.user_id, ride_id, reason).await?))
}

// ─── Driver ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptRideBody {
    vehicle_id: Uuid,
}

async fn accept_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(ride_id): Path<Uuid>,
    Json(body): Json<AcceptRideBody>,
) -> Result<Json<Ride>> {
    let ride = state
        .rides
        .accept(user.user_id, ride_id, body.vehicle_id)
        .await?;
    Ok(Json(ride))
}

async fn start_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<Ride>> {
    Ok(Json(state.rides.start(user.user_id, ride_id).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRideBody {
    /// Encoded polyline (precision 5) of the driven route
    polyline: Option<String>,
}

async fn complete_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(ride_id): Path<Uuid>,
    body: Option<Json<CompleteRideBody>>,
) -> Result<Json<Ride>> {
    let trace = body.and_then(|Json(b)| b.polyline);
    let ride = state
        .rides
        .complete(user.user_id, ride_id, trace.as_deref())
        .await?;
    Ok(Json(ride))
}
