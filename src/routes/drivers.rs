// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Driver self-service routes: onboarding, location, availability, vehicles.

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{Availability, Driver, GeoPoint, Vehicle, VehicleRates};
use crate::services::NewVehicle;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Driver routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers/apply", post(apply))
        .route("/drivers/me", get(get_me))
        .route("/drivers/me/location", put(report_location))
        .route("/drivers/me/availability", put(set_availability))
        .route("/drivers/me/vehicles", post(register_vehicle))
        .route("/drivers/me/vehicles/{id}/rates", patch(update_rates))
        .route("/drivers/me/vehicles/{id}/active", patch(set_vehicle_active))
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ApplyBody {
    /// Document kind -> upload reference
    documents: BTreeMap<String, String>,
}

async fn apply(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ApplyBody>,
) -> Result<(StatusCode, Json<Driver>)> {
    let driver = state.drivers.apply_as_driver(user.user_id, body.documents)?;
    Ok((StatusCode::CREATED, Json(driver)))
}

#[derive(Serialize)]
pub struct DriverProfileResponse {
    pub driver: Driver,
    pub vehicles: Vec<Vehicle>,
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DriverProfileResponse>> {
    let driver = state.drivers.require_driver(user.user_id)?;
    let vehicles = state.vehicles.vehicles_for_driver(driver.id);
    Ok(Json(DriverProfileResponse { driver, vehicles }))
}

// ─── Location & Availability ─────────────────────────────────

async fn report_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(point): Json<GeoPoint>,
) -> Result<StatusCode> {
    point.validate()?;
    let driver = state.drivers.require_driver(user.user_id)?;
    state.drivers.report_location(driver.id, point)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct AvailabilityBody {
    availability: Availability,
}

async fn set_availability(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AvailabilityBody>,
) -> Result<Json<Driver>> {
    let driver = state.drivers.require_driver(user.user_id)?;
    Ok(Json(
        state
            .drivers
            .set_availability(driver.id, body.availability)?,
    ))
}

// ─── Vehicles ────────────────────────────────────────────────

async fn register_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewVehicle>,
) -> Result<(StatusCode, Json<Vehicle>)> {
    let vehicle = state.vehicles.register_vehicle(user.user_id, body)?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn update_rates(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(vehicle_id): Path<Uuid>,
    Json(rates): Json<VehicleRates>,
) -> Result<Json<Vehicle>> {
    let driver = state.drivers.require_driver(user.user_id)?;
    Ok(Json(
        state.vehicles.update_rates(driver.id, vehicle_id, rates)?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VehicleActiveBody {
    is_active: bool,
}

async fn set_vehicle_active(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(vehicle_id): Path<Uuid>,
    Json(body): Json<VehicleActiveBody>,
) -> Result<Json<Vehicle>> {
    let driver = state.drivers.require_driver(user.user_id)?;
    Ok(Json(
        state
            .vehicles
            .set_active(driver.id, vehicle_id, body.is_active)?,
    ))
}
