// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle model and service categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Service tier of a vehicle or ride. Drives per-km rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Economy,
    Comfort,
    Xl,
    /// Electric-only tier.
    Green,
    Premium,
}

impl Category {
    /// Fuel type assumed when pricing a ride of this category.
    pub fn fuel_type(self) -> FuelType {
        match self {
            Category::Green => FuelType::Electric,
            _ => FuelType::Petrol,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Economy => "economy",
            Category::Comfort => "comfort",
            Category::Xl => "xl",
            Category::Green => "green",
            Category::Premium => "premium",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    Electric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Sedan,
    Hatchback,
    Suv,
    Van,
    Motorbike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCondition {
    Excellent,
    Good,
    Fair,
}

/// Per-vehicle rate overrides. Seeded from the pricing config at registration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRates {
    pub charges_per_km: f64,
    pub charges_per_minute: f64,
}

/// A vehicle registered by a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    /// Owning driver profile
    pub driver_id: Uuid,
    pub category: Category,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    /// Normalized (uppercase, no spaces) plate number
    pub plate: String,
    pub make: String,
    pub model: String,
    /// Passenger seats
    pub capacity: u8,
    pub fuel_type: FuelType,
    pub condition: VehicleCondition,
    pub is_active: bool,
    /// Reference returned by the media upload collaborator
    pub image_url: String,
    pub rates: VehicleRates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical form used for plate uniqueness checks.
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}
