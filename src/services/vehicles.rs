// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle registration, rate overrides and activation.

use crate::db::MemoryDb;
use crate::error::{AppError, ForbiddenReason, Result};
use crate::models::vehicle::normalize_plate;
use crate::models::{
    Category, FuelType, Vehicle, VehicleCondition, VehicleRates, VehicleType,
};
use crate::services::PricingConfigStore;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Registration payload. The image reference comes from the upload collaborator.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub category: Category,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    #[validate(length(min = 2, max = 15))]
    pub plate: String,
    #[validate(length(min = 1, max = 60))]
    pub make: String,
    #[validate(length(min = 1, max = 60))]
    pub model: String,
    #[validate(range(min = 1, max = 16))]
    pub capacity: u8,
    pub fuel_type: FuelType,
    pub condition: VehicleCondition,
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct VehicleRegistry {
    db: MemoryDb,
    pricing: Arc<PricingConfigStore>,
}

impl VehicleRegistry {
    pub fn new(db: MemoryDb, pricing: Arc<PricingConfigStore>) -> Self {
        Self { db, pricing }
    }

    /// Register a vehicle for the driver owned by `user_id`.
    ///
    /// Rates start at the current pricing config's values for the
    /// vehicle's category.
    pub fn register_vehicle(&self, user_id: Uuid, data: NewVehicle) -> Result<Vehicle> {
        let driver = self.db.get_driver_by_user(user_id).ok_or_else(|| {
            AppError::NotFound(format!("No driver profile for user {}", user_id))
        })?;

        data.validate()?;
        let image_url = data
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Validation("vehicle image is required".to_string()))?
            .to_string();
        if data.category == Category::Green && data.fuel_type != FuelType::Electric {
            return Err(AppError::Validation(
                "green vehicles must be electric".to_string(),
            ));
        }
        let plate = normalize_plate(&data.plate);
        if plate.len() < 2 {
            return Err(AppError::Validation("invalid plate number".to_string()));
        }

        let config = self.pricing.current()?;
        let charges_per_km = *config
            .per_km_rate
            .get(&data.category)
            .ok_or(AppError::UnsupportedCategory(data.category))?;

        let now = Utc::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            driver_id: driver.id,
            category: data.category,
            vehicle_type: data.vehicle_type,
            plate,
            make: data.make.trim().to_string(),
            model: data.model.trim().to_string(),
            capacity: data.capacity,
            fuel_type: data.fuel_type,
            condition: data.condition,
            is_active: true,
            image_url,
            rates: VehicleRates {
                charges_per_km,
                charges_per_minute: config.per_minute_rate,
            },
            created_at: now,
            updated_at: now,
        };

        let vehicle = self.db.insert_vehicle(vehicle)?;
        tracing::info!(
            vehicle_id = %vehicle.id,
            driver_id = %driver.id,
            category = %vehicle.category,
            "Vehicle registered"
        );
        Ok(vehicle)
    }

    /// Override a vehicle's rates. Only the owning driver may do this.
    pub fn update_rates(
        &self,
        driver_id: Uuid,
        vehicle_id: Uuid,
        rates: VehicleRates,
    ) -> Result<Vehicle> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(rates.charges_per_km) || !valid(rates.charges_per_minute) {
            return Err(AppError::Validation("rates must be positive".to_string()));
        }

        let vehicle = self.db.update_vehicle(vehicle_id, |vehicle| {
            if vehicle.driver_id != driver_id {
                return Err(AppError::Forbidden(ForbiddenReason::NotVehicleOwner));
            }
            vehicle.rates = rates;
            vehicle.updated_at = Utc::now();
            Ok(vehicle.clone())
        })?;

        tracing::info!(vehicle_id = %vehicle_id, driver_id = %driver_id, "Vehicle rates updated");
        Ok(vehicle)
    }

    /// Take a vehicle out of (or back into) service. Owner only.
    ///
    /// A vehicle serving the driver's active ride cannot be deactivated.
    /// The slot is read under the vehicle's lock; `accept` re-reads the
    /// vehicle after claiming the slot, so one of the two always sees the
    /// other.
    pub fn set_active(&self, driver_id: Uuid, vehicle_id: Uuid, active: bool) -> Result<Vehicle> {
        self.db.update_vehicle(vehicle_id, |vehicle| {
            if vehicle.driver_id != driver_id {
                return Err(AppError::Forbidden(ForbiddenReason::NotVehicleOwner));
            }
            let in_use = self
                .db
                .driver_slot(driver_id)
                .is_some_and(|slot| slot.vehicle_id == vehicle_id);
            if in_use && !active {
                return Err(AppError::Validation(
                    "vehicle is in use on an active ride".to_string(),
                ));
            }
            vehicle.is_active = active;
            vehicle.updated_at = Utc::now();
            Ok(vehicle.clone())
        })
    }

    pub fn vehicles_for_driver(&self, driver_id: Uuid) -> Vec<Vehicle> {
        self.db.vehicles_for_driver(driver_id)
    }
}
