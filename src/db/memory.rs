// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store with typed operations.
//!
//! Provides:
//! - Drivers (profile, verification, location + geo index)
//! - Vehicles (with a plate registry)
//! - Rides (with active-ride slots per rider and per driver)
//! - The persisted pricing record
//!
//! Every conditional write runs its check and its mutation under the
//! entry's exclusive lock. `update_ride` is the compare-and-swap used
//! for lifecycle transitions.
//!
//! Lock order: a driver or vehicle entry may be held while touching the
//! driver-slot map, never the reverse.

use crate::db::DriverGeoIndex;
use crate::error::{AppError, ConflictReason, Result};
use crate::models::{
    Availability, Category, Driver, GeoPoint, PricingConfig, Ride, Vehicle, VerificationStatus,
};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// The ride a driver is committed to and the vehicle serving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSlot {
    pub ride_id: Uuid,
    pub vehicle_id: Uuid,
}

#[derive(Default)]
struct Tables {
    drivers: DashMap<Uuid, Driver>,
    driver_by_user: DashMap<Uuid, Uuid>,
    driver_locations: DriverGeoIndex,
    vehicles: DashMap<Uuid, Vehicle>,
    /// Normalized plate -> vehicle id
    plates: DashMap<String, Uuid>,
    rides: DashMap<Uuid, Ride>,
    /// Rider id -> their single non-terminal ride
    active_ride_by_rider: DashMap<Uuid, Uuid>,
    /// Driver id -> their Accepted/InProgress ride
    active_ride_by_driver: DashMap<Uuid, DriverSlot>,
    pricing: RwLock<Option<PricingConfig>>,
}

/// Shared handle to the store. Cloning is cheap.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Driver Operations ───────────────────────────────────────

    /// Insert a new profile unless the user already has one.
    pub fn insert_driver(&self, driver: Driver) -> Result<Driver> {
        match self.tables.driver_by_user.entry(driver.user_id) {
            Entry::Occupied(_) => Err(AppError::Conflict(ConflictReason::DriverProfileExists)),
            Entry::Vacant(slot) => {
                slot.insert(driver.id);
                self.tables.drivers.insert(driver.id, driver.clone());
                Ok(driver)
            }
        }
    }

    pub fn get_driver(&self, driver_id: Uuid) -> Option<Driver> {
        self.tables.drivers.get(&driver_id).map(|d| d.clone())
    }

    pub fn get_driver_by_user(&self, user_id: Uuid) -> Option<Driver> {
        let driver_id = *self.tables.driver_by_user.get(&user_id)?;
        self.get_driver(driver_id)
    }

    /// Apply `f` to a driver atomically. Nothing is written if `f` fails.
    pub fn update_driver<T>(
        &self,
        driver_id: Uuid,
        f: impl FnOnce(&mut Driver) -> Result<T>,
    ) -> Result<T> {
        let mut entry = self
            .tables
            .drivers
            .get_mut(&driver_id)
            .ok_or_else(|| AppError::NotFound(format!("Driver {} not found", driver_id)))?;

        let mut draft = entry.clone();
        let out = f(&mut draft)?;
        *entry = draft;
        Ok(out)
    }

    /// Record a driver's position and move them in the geo index.
    ///
    /// Last write wins. The index is updated while the driver entry is
    /// held so concurrent reports for one driver cannot interleave.
    pub fn set_driver_location(
        &self,
        driver_id: Uuid,
        point: GeoPoint,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut entry = self
            .tables
            .drivers
            .get_mut(&driver_id)
            .ok_or_else(|| AppError::NotFound(format!("Driver {} not found", driver_id)))?;

        if !self.tables.driver_locations.upsert(driver_id, &point) {
            return Err(AppError::Validation("invalid coordinates".to_string()));
        }
        entry.location = Some(point);
        entry.location_updated_at = Some(at);
        Ok(())
    }

    /// Drivers whose last report lies within `radius_km` of `center`,
    /// paired with their distance in meters.
    pub fn drivers_near(&self, center: &GeoPoint, radius_km: f64) -> Vec<(Driver, f64)> {
        let radius_m = radius_km * 1000.0;
        self.tables
            .driver_locations
            .candidates_within(center, radius_km)
            .into_iter()
            .filter_map(|id| self.get_driver(id))
            .filter_map(|driver| {
                let distance = driver.location?.distance_meters(center);
                (distance <= radius_m).then_some((driver, distance))
            })
            .collect()
    }

    // ─── Vehicle Operations ──────────────────────────────────────

    /// Insert a vehicle unless its plate is already registered.
    pub fn insert_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle> {
        match self.tables.plates.entry(vehicle.plate.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(ConflictReason::PlateAlreadyRegistered)),
            Entry::Vacant(slot) => {
                slot.insert(vehicle.id);
                self.tables.vehicles.insert(vehicle.id, vehicle.clone());
                Ok(vehicle)
            }
        }
    }

    pub fn get_vehicle(&self, vehicle_id: Uuid) -> Option<Vehicle> {
        self.tables.vehicles.get(&vehicle_id).map(|v| v.clone())
    }

    /// Apply `f` to a vehicle atomically. Nothing is written if `f` fails.
    pub fn update_vehicle<T>(
        &self,
        vehicle_id: Uuid,
        f: impl FnOnce(&mut Vehicle) -> Result<T>,
    ) -> Result<T> {
        let mut entry = self
            .tables
            .vehicles
            .get_mut(&vehicle_id)
            .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found", vehicle_id)))?;

        let mut draft = entry.clone();
        let out = f(&mut draft)?;
        *entry = draft;
        Ok(out)
    }

    pub fn vehicles_for_driver(&self, driver_id: Uuid) -> Vec<Vehicle> {
        let mut vehicles: Vec<Vehicle> = self
            .tables
            .vehicles
            .iter()
            .filter(|v| v.driver_id == driver_id)
            .map(|v| v.clone())
            .collect();
        vehicles.sort_by_key(|v| v.created_at);
        vehicles
    }

    pub fn active_vehicles_in_category(&self, category: Category) -> Vec<Vehicle> {
        self.tables
            .vehicles
            .iter()
            .filter(|v| v.is_active && v.category == category)
            .map(|v| v.clone())
            .collect()
    }

    // ─── Ride Operations ─────────────────────────────────────────

    /// Insert a ride and claim the rider's active slot in one step.
    pub fn insert_ride(&self, ride: Ride) -> Result<Ride> {
        match self.tables.active_ride_by_rider.entry(ride.rider_id) {
            Entry::Occupied(_) => Err(AppError::Conflict(ConflictReason::ActiveRideExists)),
            Entry::Vacant(slot) => {
                slot.insert(ride.id);
                self.tables.rides.insert(ride.id, ride.clone());
                Ok(ride)
            }
        }
    }

    pub fn get_ride(&self, ride_id: Uuid) -> Option<Ride> {
        self.tables.rides.get(&ride_id).map(|r| r.clone())
    }

    /// Atomic conditional update of a ride.
    ///
    /// `f` sees the current record and either mutates it (the write is
    /// committed) or returns an error (nothing is written). No other
    /// writer can observe or modify the ride in between.
    pub fn update_ride<T>(&self, ride_id: Uuid, f: impl FnOnce(&mut Ride) -> Result<T>) -> Result<T> {
        let mut entry = self
            .tables
            .rides
            .get_mut(&ride_id)
            .ok_or_else(|| AppError::NotFound(format!("Ride {} not found", ride_id)))?;

        let mut draft = entry.clone();
        let out = f(&mut draft)?;
        debug_assert!(draft.assignment_consistent(), "ride {} assignment", ride_id);
        *entry = draft;
        Ok(out)
    }

    pub fn active_ride_for_rider(&self, rider_id: Uuid) -> Option<Ride> {
        let ride_id = *self.tables.active_ride_by_rider.get(&rider_id)?;
        self.get_ride(ride_id)
    }

    /// Free the rider's slot if it still points at `ride_id`.
    pub fn release_rider_slot(&self, rider_id: Uuid, ride_id: Uuid) {
        self.tables
            .active_ride_by_rider
            .remove_if(&rider_id, |_, current| *current == ride_id);
    }

    /// Reserve an online driver for `ride_id` and mark them `OnTrip`.
    ///
    /// The availability check, the slot claim and the availability change
    /// happen under the driver's entry lock.
    pub fn claim_driver_slot(&self, driver_id: Uuid, ride_id: Uuid, vehicle_id: Uuid) -> Result<()> {
        let mut driver = self
            .tables
            .drivers
            .get_mut(&driver_id)
            .ok_or_else(|| AppError::NotFound(format!("Driver {} not found", driver_id)))?;

        match driver.availability {
            Availability::Online => {}
            Availability::OnTrip => return Err(AppError::Conflict(ConflictReason::DriverBusy)),
            Availability::Offline => {
                return Err(AppError::Validation(
                    "driver must be online to accept rides".to_string(),
                ))
            }
        }

        match self.tables.active_ride_by_driver.entry(driver_id) {
            Entry::Occupied(_) => Err(AppError::Conflict(ConflictReason::DriverBusy)),
            Entry::Vacant(slot) => {
                slot.insert(DriverSlot { ride_id, vehicle_id });
                driver.availability = Availability::OnTrip;
                driver.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    /// Free the driver's slot if it still points at `ride_id`.
    ///
    /// A driver left without a ride goes back `Online`, or `Offline` if
    /// they are no longer approved.
    pub fn release_driver_slot(&self, driver_id: Uuid, ride_id: Uuid) {
        let driver = self.tables.drivers.get_mut(&driver_id);
        self.tables
            .active_ride_by_driver
            .remove_if(&driver_id, |_, slot| slot.ride_id == ride_id);

        if let Some(mut driver) = driver {
            if driver.availability == Availability::OnTrip
                && !self.tables.active_ride_by_driver.contains_key(&driver_id)
            {
                driver.availability = if driver.status == VerificationStatus::Approved {
                    Availability::Online
                } else {
                    Availability::Offline
                };
                driver.updated_at = Utc::now();
            }
        }
    }

    pub fn driver_slot(&self, driver_id: Uuid) -> Option<DriverSlot> {
        self.tables.active_ride_by_driver.get(&driver_id).map(|s| *s)
    }

    pub fn active_ride_for_driver(&self, driver_id: Uuid) -> Option<Ride> {
        let slot = self.driver_slot(driver_id)?;
        self.get_ride(slot.ride_id)
    }

    /// Snapshot of rides matching `predicate`.
    ///
    /// Collected before returning so callers can update the rides
    /// without holding iteration locks.
    pub fn rides_where(&self, predicate: impl Fn(&Ride) -> bool) -> Vec<Ride> {
        self.tables
            .rides
            .iter()
            .filter(|r| predicate(r.value()))
            .map(|r| r.clone())
            .collect()
    }

    // ─── Pricing Record ──────────────────────────────────────────

    pub fn get_pricing_config(&self) -> Result<Option<PricingConfig>> {
        let guard = self
            .tables
            .pricing
            .read()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("pricing record lock poisoned")))?;
        Ok(guard.clone())
    }

    pub fn set_pricing_config(&self, config: &PricingConfig) -> Result<()> {
        let mut guard = self
            .tables
            .pricing
            .write()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("pricing record lock poisoned")))?;
        *guard = Some(config.clone());
        Ok(())
    }
}
