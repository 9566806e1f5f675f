// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Driver profiles: onboarding, verification, availability and location.

use crate::db::MemoryDb;
use crate::error::{AppError, ConflictReason, ForbiddenReason, Result};
use crate::models::{Availability, Driver, GeoPoint, VerificationStatus};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Longest accepted document reference.
const MAX_DOCUMENT_REF_LEN: usize = 500;

#[derive(Clone)]
pub struct DriverDirectory {
    db: MemoryDb,
}

impl DriverDirectory {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }

    /// Create a driver profile for `user_id` awaiting review.
    ///
    /// `documents` maps a document kind (e.g. "license") to the reference
    /// returned by the upload collaborator; at least one is required.
    pub fn apply_as_driver(
        &self,
        user_id: Uuid,
        documents: BTreeMap<String, String>,
    ) -> Result<Driver> {
        if documents.is_empty() {
            return Err(AppError::Validation(
                "at least one document is required".to_string(),
            ));
        }
        if let Some((kind, _)) = documents.iter().find(|(kind, reference)| {
            kind.trim().is_empty()
                || reference.trim().is_empty()
                || reference.len() > MAX_DOCUMENT_REF_LEN
        }) {
            return Err(AppError::Validation(format!(
                "invalid document entry '{}'",
                kind
            )));
        }

        let now = Utc::now();
        let driver = Driver {
            id: Uuid::new_v4(),
            user_id,
            status: VerificationStatus::Pending,
            availability: Availability::Offline,
            documents,
            location: None,
            location_updated_at: None,
            rating: 5.0,
            total_rides: 0,
            created_at: now,
            updated_at: now,
        };

        let driver = self.db.insert_driver(driver)?;
        tracing::info!(driver_id = %driver.id, user_id = %user_id, "Driver application received");
        Ok(driver)
    }

    /// Admin review. Rejecting a driver also takes them offline.
    pub fn set_verification_status(
        &self,
        driver_id: Uuid,
        status: VerificationStatus,
    ) -> Result<Driver> {
        let driver = self.db.update_driver(driver_id, |driver| {
            driver.status = status;
            if status == VerificationStatus::Rejected && driver.availability == Availability::Online
            {
                driver.availability = Availability::Offline;
            }
            driver.updated_at = Utc::now();
            Ok(driver.clone())
        })?;

        tracing::info!(driver_id = %driver_id, status = ?status, "Driver verification updated");
        Ok(driver)
    }

    /// Record the driver's current position. Last write wins.
    pub fn report_location(&self, driver_id: Uuid, point: GeoPoint) -> Result<()> {
        if !point.is_valid() {
            return Err(AppError::Validation("invalid coordinates".to_string()));
        }
        self.db.set_driver_location(driver_id, point, Utc::now())
    }

    /// Go online or offline.
    ///
    /// Only approved drivers may go online. `OnTrip` is managed by the ride
    /// lifecycle and cannot be set or left here.
    pub fn set_availability(&self, driver_id: Uuid, availability: Availability) -> Result<Driver> {
        if availability == Availability::OnTrip {
            return Err(AppError::Validation(
                "availability must be online or offline".to_string(),
            ));
        }

        let driver = self.db.update_driver(driver_id, |driver| {
            if driver.availability == Availability::OnTrip {
                return Err(AppError::Conflict(ConflictReason::DriverOnTrip));
            }
            if availability == Availability::Online
                && driver.status != VerificationStatus::Approved
            {
                return Err(AppError::Forbidden(ForbiddenReason::DriverNotApproved));
            }
            driver.availability = availability;
            driver.updated_at = Utc::now();
            Ok(driver.clone())
        })?;

        tracing::debug!(driver_id = %driver_id, availability = ?availability, "Driver availability changed");
        Ok(driver)
    }

    pub(crate) fn record_completed_ride(&self, driver_id: Uuid) {
        let result = self.db.update_driver(driver_id, |driver| {
            driver.total_rides += 1;
            Ok(())
        });
        if let Err(e) = result {
            tracing::warn!(driver_id = %driver_id, error = %e, "Failed to bump ride count");
        }
    }

    pub fn get(&self, driver_id: Uuid) -> Result<Driver> {
        self.db
            .get_driver(driver_id)
            .ok_or_else(|| AppError::NotFound(format!("Driver {} not found", driver_id)))
    }

    pub fn get_by_user(&self, user_id: Uuid) -> Option<Driver> {
        self.db.get_driver_by_user(user_id)
    }

    /// The caller's driver profile, or Forbidden if they have none.
    pub fn require_driver(&self, user_id: Uuid) -> Result<Driver> {
        self.get_by_user(user_id)
            .ok_or(AppError::Forbidden(ForbiddenReason::NotRegisteredDriver))
    }
}
