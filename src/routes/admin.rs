// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes: driver verification and the pricing record.

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{Driver, PricingConfig, VerificationStatus};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Admin routes (require an admin JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/drivers/{id}/verification",
            patch(set_verification_status),
        )
        .route("/admin/pricing", get(get_pricing).put(put_pricing))
}

#[derive(Deserialize)]
struct VerificationBody {
    status: VerificationStatus,
}

async fn set_verification_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(driver_id): Path<Uuid>,
    Json(body): Json<VerificationBody>,
) -> Result<Json<Driver>> {
    user.require_admin()?;
    tracing::info!(admin = %user.user_id, driver_id = %driver_id, status = ?body.status, "Admin verification change");
    Ok(Json(
        state
            .drivers
            .set_verification_status(driver_id, body.status)?,
    ))
}

async fn get_pricing(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PricingConfig>> {
    user.require_admin()?;
    Ok(Json(state.pricing.current()?.as_ref().clone()))
}

async fn put_pricing(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PricingConfig>,
) -> Result<Json<PricingConfig>> {
    user.require_admin()?;
    let stored = state.pricing.replace(body)?;
    tracing::info!(admin = %user.user_id, version = stored.version, "Admin pricing update");
    Ok(Json(stored.as_ref().clone()))
}
