// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound collaborators: driver notification and settlement ledger.

use crate::models::{Category, GeoPoint, PaymentMethod, Ride};
use crate::services::providers::CollaboratorError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

/// What a candidate driver is shown when offered a ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideSummary {
    pub ride_id: Uuid,
    pub category: Category,
    pub pickup_address: String,
    pub pickup: GeoPoint,
    pub destination_address: String,
    pub estimated_fare: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
}

impl From<&Ride> for RideSummary {
    fn from(ride: &Ride) -> Self {
        Self {
            ride_id: ride.id,
            category: ride.category,
            pickup_address: ride.pickup.address.clone(),
            pickup: ride.pickup.point(),
            destination_address: ride.destination.address.clone(),
            estimated_fare: ride.estimated_fare,
            currency: ride.currency.clone(),
            payment_method: ride.payment_method,
        }
    }
}

/// Push a ride offer to drivers. Best effort, at most once.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn notify(
        &self,
        driver_ids: &[Uuid],
        summary: &RideSummary,
    ) -> Result<(), CollaboratorError>;
}

/// Records the commission split for a completed ride.
///
/// Implementations must be idempotent per ride id; the sweep retries
/// handoffs that failed.
#[async_trait]
pub trait SettlementLedger: Send + Sync {
    async fn record_ride_transaction(
        &self,
        ride: &Ride,
        commission: f64,
    ) -> Result<(), CollaboratorError>;
}

/// Notification channel that only logs. Used when no push service is wired.
pub struct LogNotificationChannel;

#[async_trait]
impl NotificationChannel for LogNotificationChannel {
    async fn notify(
        &self,
        driver_ids: &[Uuid],
        summary: &RideSummary,
    ) -> Result<(), CollaboratorError> {
        tracing::info!(
            ride_id = %summary.ride_id,
            drivers = ?driver_ids,
            fare = summary.estimated_fare,
            "Ride offered to drivers"
        );
        Ok(())
    }
}

/// A recorded ride transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub ride_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub fare: f64,
    pub commission: f64,
    pub driver_earnings: f64,
    pub payment_method: PaymentMethod,
}

/// In-process ledger keyed by ride id.
#[derive(Default)]
pub struct InMemoryLedger {
    entries: DashMap<Uuid, LedgerEntry>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ride_id: Uuid) -> Option<LedgerEntry> {
        self.entries.get(&ride_id).map(|e| e.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SettlementLedger for InMemoryLedger {
    async fn record_ride_transaction(
        &self,
        ride: &Ride,
        commission: f64,
    ) -> Result<(), CollaboratorError> {
        let fare = ride
            .fare
            .ok_or_else(|| CollaboratorError::Api(format!("ride {} has no final fare", ride.id)))?;

        self.entries.entry(ride.id).or_insert_with(|| LedgerEntry {
            ride_id: ride.id,
            driver_id: ride.driver_id,
            fare,
            commission,
            driver_earnings: fare - commission,
            payment_method: ride.payment_method,
        });
        Ok(())
    }
}
