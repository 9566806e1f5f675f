// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::models::{Category, RideStatus};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Why a request conflicts with the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictReason {
    #[error("rider already has an active ride")]
    ActiveRideExists,

    #[error("ride is no longer available")]
    RideNoLongerAvailable,

    #[error("driver profile already exists")]
    DriverProfileExists,

    #[error("cannot {action} a ride that is {status}")]
    InvalidTransition {
        status: RideStatus,
        action: &'static str,
    },

    #[error("driver already has an active ride")]
    DriverBusy,

    #[error("driver is on a trip")]
    DriverOnTrip,

    #[error("plate number already registered")]
    PlateAlreadyRegistered,
}

impl ConflictReason {
    pub fn code(&self) -> &'static str {
        match self {
            ConflictReason::ActiveRideExists => "active_ride_exists",
            ConflictReason::RideNoLongerAvailable => "ride_no_longer_available",
            ConflictReason::DriverProfileExists => "driver_profile_exists",
            ConflictReason::InvalidTransition { .. } => "invalid_transition",
            ConflictReason::DriverBusy => "driver_busy",
            ConflictReason::DriverOnTrip => "driver_on_trip",
            ConflictReason::PlateAlreadyRegistered => "plate_already_registered",
        }
    }
}

/// Why the caller may not perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ForbiddenReason {
    #[error("caller is not the assigned driver")]
    NotAssignedDriver,

    #[error("caller has no driver profile")]
    NotRegisteredDriver,

    #[error("vehicle belongs to another driver")]
    NotVehicleOwner,

    #[error("ride belongs to another rider")]
    NotRideOwner,

    #[error("driver is not approved")]
    DriverNotApproved,

    #[error("admin privileges required")]
    AdminOnly,
}

impl ForbiddenReason {
    pub fn code(&self) -> &'static str {
        match self {
            ForbiddenReason::NotAssignedDriver => "not_assigned_driver",
            ForbiddenReason::NotRegisteredDriver => "not_registered_driver",
            ForbiddenReason::NotVehicleOwner => "not_vehicle_owner",
            ForbiddenReason::NotRideOwner => "not_ride_owner",
            ForbiddenReason::DriverNotApproved => "driver_not_approved",
            ForbiddenReason::AdminOnly => "admin_only",
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(ConflictReason),

    #[error("Forbidden: {0}")]
    Forbidden(ForbiddenReason),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unsupported category: {0}")]
    UnsupportedCategory(Category),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn conflict_reason(&self) -> Option<&ConflictReason> {
        match self {
            AppError::Conflict(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn forbidden_reason(&self) -> Option<ForbiddenReason> {
        match self {
            AppError::Forbidden(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, code, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None, None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None, None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                None,
                Some(msg.clone()),
            ),
            AppError::Conflict(reason) => (
                StatusCode::CONFLICT,
                "conflict",
                Some(reason.code()),
                Some(reason.to_string()),
            ),
            AppError::Forbidden(reason) => (
                StatusCode::FORBIDDEN,
                "forbidden",
                Some(reason.code()),
                Some(reason.to_string()),
            ),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "not_found", None, Some(msg.clone()))
            }
            AppError::UnsupportedCategory(category) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unsupported_category",
                None,
                Some(category.to_string()),
            ),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None, None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
