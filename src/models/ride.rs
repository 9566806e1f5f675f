// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride model and lifecycle states.

use crate::models::{Category, FareBreakdown, Place};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ride lifecycle state.
///
/// ```text
/// Scheduled -> Pending -> Accepted -> InProgress -> Completed
///                 |           |
///                 +-----------+--> Cancelled
///                 +--> NoDriversAvailable
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Scheduled,
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
    NoDriversAvailable,
}

impl RideStatus {
    /// Terminal states are final; a rider may hold at most one non-terminal ride.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RideStatus::Completed | RideStatus::Cancelled | RideStatus::NoDriversAvailable
        )
    }

    /// States in which `driver_id`/`vehicle_id` must be set.
    pub fn has_assignment(self) -> bool {
        matches!(
            self,
            RideStatus::Accepted | RideStatus::InProgress | RideStatus::Completed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Scheduled => "scheduled",
            RideStatus::Pending => "pending",
            RideStatus::Accepted => "accepted",
            RideStatus::InProgress => "in_progress",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
            RideStatus::NoDriversAvailable => "no_drivers_available",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    Card,
    Wallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Rider,
    Driver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub by: CancelledBy,
    pub actor_user_id: Uuid,
    pub reason: Option<String>,
    /// Driver that held the ride when it was cancelled after acceptance
    pub previous_driver_id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

/// Settlement handoff state for completed rides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Recorded,
    Failed,
}

/// One rider's transport request, from creation to a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub pickup: Place,
    pub destination: Place,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub status: RideStatus,
    pub estimated_fare: f64,
    /// Quote used for `estimated_fare`, replaced by the final breakdown on completion
    pub fare_breakdown: FareBreakdown,
    /// Set on completion
    pub fare: Option<f64>,
    pub system_commission: Option<f64>,
    pub fare_approximate: bool,
    pub currency: String,
    /// Drivers notified by the last dispatch pass
    #[serde(default)]
    pub offered_to: Vec<Uuid>,
    pub cancellation: Option<Cancellation>,
    pub settlement: Option<SettlementStatus>,
    pub created_at: DateTime<Utc>,
    /// When the ride (re)entered Pending; drives expiry
    pub pending_since: Option<DateTime<Utc>>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    /// Assignment fields agree with the status.
    pub fn assignment_consistent(&self) -> bool {
        let assigned = self.driver_id.is_some() && self.vehicle_id.is_some();
        let unassigned = self.driver_id.is_none() && self.vehicle_id.is_none();
        if self.status.has_assignment() {
            assigned
        } else {
            unassigned
        }
    }

    pub fn is_assigned_to(&self, driver_id: Uuid) -> bool {
        self.driver_id == Some(driver_id)
    }
}
