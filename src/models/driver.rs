// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Driver profile model.

use crate::models::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Admin-controlled verification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Whether the driver can currently be dispatched.
///
/// Independent of [`VerificationStatus`]; matching requires both
/// `Approved` and `Online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Offline,
    Online,
    OnTrip,
}

/// Driver profile. One per user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: VerificationStatus,
    pub availability: Availability,
    /// Document kind (e.g. "license") -> uploaded document reference
    pub documents: BTreeMap<String, String>,
    /// Last reported position, None until the first report
    pub location: Option<GeoPoint>,
    pub location_updated_at: Option<DateTime<Utc>>,
    pub rating: f32,
    pub total_rides: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// Approved and online: the driver may be offered rides.
    pub fn is_dispatchable(&self) -> bool {
        self.status == VerificationStatus::Approved && self.availability == Availability::Online
    }
}
