// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Candidate selection for a ride.
//!
//! 1. Collect owners of active vehicles in the ride's category
//! 2. Query the geo index around the pickup, keep those owners
//! 3. Keep approved drivers who are online
//! 4. Order by distance, cap the list
//!
//! Driver locations may be slightly stale. That only affects ranking; the
//! binding decision happens at accept time.

use crate::db::MemoryDb;
use crate::models::Ride;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// A driver eligible to accept a ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub driver_id: Uuid,
    pub distance_meters: f64,
}

#[derive(Clone)]
pub struct DispatchMatcher {
    db: MemoryDb,
    radius_km: f64,
    max_candidates: usize,
}

impl DispatchMatcher {
    pub fn new(db: MemoryDb, radius_km: f64, max_candidates: usize) -> Self {
        Self {
            db,
            radius_km,
            max_candidates,
        }
    }

    /// Eligible drivers for `ride`, nearest first. Empty when nobody qualifies.
    pub fn find_candidates(&self, ride: &Ride) -> Vec<Candidate> {
        let owners: HashSet<Uuid> = self
            .db
            .active_vehicles_in_category(ride.category)
            .into_iter()
            .map(|v| v.driver_id)
            .collect();
        if owners.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = self
            .db
            .drivers_near(&ride.pickup.point(), self.radius_km)
            .into_iter()
            .filter(|(driver, _)| owners.contains(&driver.id) && driver.is_dispatchable())
            .map(|(driver, distance_meters)| Candidate {
                driver_id: driver.id,
                distance_meters,
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then_with(|| a.driver_id.cmp(&b.driver_id))
        });
        candidates.truncate(self.max_candidates);

        tracing::debug!(
            ride_id = %ride.id,
            category = %ride.category,
            candidates = candidates.len(),
            "Dispatch candidates selected"
        );
        candidates
    }
}
