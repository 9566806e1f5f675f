// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pricing configuration, trip context and fare breakdown types.

use crate::models::{Category, FuelType, VehicleRates};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Normal,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadCondition {
    Good,
    Poor,
}

/// Night surcharge window in local hours. `start_hour > end_hour` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub rate: f64,
}

impl NightWindow {
    /// Whether a local hour (0-23) falls in `[start_hour, end_hour)`.
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour == self.end_hour {
            return false;
        }
        if self.start_hour > self.end_hour {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            hour >= self.start_hour && hour < self.end_hour
        }
    }
}

/// Admin-edited pricing record. The only source of rates for the fare engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    /// Bumped by the store on every replace; ignored on input.
    #[serde(default)]
    pub version: u64,
    pub currency: String,
    pub base_fare: f64,
    pub per_km_rate: BTreeMap<Category, f64>,
    pub per_minute_rate: f64,
    pub system_commission_rate: f64,
    pub night: NightWindow,
    /// Minutes east of UTC used to derive the local hour for the night window
    #[serde(default)]
    pub utc_offset_minutes: i32,
    pub weather_multiplier: BTreeMap<Weather, f64>,
    pub road_multiplier: BTreeMap<RoadCondition, f64>,
    /// Additive, applied after the multipliers
    #[serde(default)]
    pub fuel_adjustment: BTreeMap<FuelType, f64>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Default for PricingConfig {
    /// The single default rate table used to seed the store.
    fn default() -> Self {
        Self {
            version: 1,
            currency: "KES".to_string(),
            base_fare: 150.0,
            per_km_rate: BTreeMap::from([
                (Category::Economy, 30.0),
                (Category::Comfort, 40.0),
                (Category::Xl, 50.0),
                (Category::Green, 35.0),
                (Category::Premium, 60.0),
            ]),
            per_minute_rate: 5.0,
            system_commission_rate: 0.15,
            night: NightWindow {
                start_hour: 22,
                end_hour: 6,
                rate: 1.4,
            },
            utc_offset_minutes: 0,
            weather_multiplier: BTreeMap::from([(Weather::Normal, 1.0), (Weather::Bad, 1.3)]),
            road_multiplier: BTreeMap::from([
                (RoadCondition::Good, 1.0),
                (RoadCondition::Poor, 1.15),
            ]),
            fuel_adjustment: BTreeMap::from([
                (FuelType::Petrol, 0.0),
                (FuelType::Diesel, 0.0),
                (FuelType::Hybrid, 0.0),
                (FuelType::Electric, -10.0),
            ]),
            updated_at: Utc::now(),
        }
    }
}

impl PricingConfig {
    /// Reject configs the fare engine cannot price with sensibly.
    pub fn validate(&self) -> Result<(), String> {
        if self.per_km_rate.is_empty() {
            return Err("perKmRate must contain at least one category".to_string());
        }
        let non_negative = [
            ("baseFare", self.base_fare),
            ("perMinuteRate", self.per_minute_rate),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number", name));
            }
        }
        if let Some((category, _)) = self
            .per_km_rate
            .iter()
            .find(|(_, r)| !r.is_finite() || **r < 0.0)
        {
            return Err(format!("perKmRate[{}] must be non-negative", category));
        }
        if !(0.0..=1.0).contains(&self.system_commission_rate) {
            return Err("systemCommissionRate must be between 0 and 1".to_string());
        }
        if self.night.start_hour > 23 || self.night.end_hour > 23 {
            return Err("night window hours must be in 0..=23".to_string());
        }
        let multipliers = std::iter::once(self.night.rate)
            .chain(self.weather_multiplier.values().copied())
            .chain(self.road_multiplier.values().copied());
        for m in multipliers {
            if !m.is_finite() || m <= 0.0 {
                return Err("multipliers must be positive".to_string());
            }
        }
        if self.fuel_adjustment.values().any(|a| !a.is_finite()) {
            return Err("fuelAdjustment values must be finite".to_string());
        }
        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err("utcOffsetMinutes out of range".to_string());
        }
        Ok(())
    }

    /// Copy of this config with a vehicle's own rates for `category`.
    pub fn with_vehicle_rates(&self, category: Category, rates: &VehicleRates) -> Self {
        let mut config = self.clone();
        config.per_km_rate.insert(category, rates.charges_per_km);
        config.per_minute_rate = rates.charges_per_minute;
        config
    }
}

/// Route between two points as reported by the routing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Encoded polyline (precision 5), when the provider returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyline: Option<String>,
}

/// Contextual inputs that scale the fare.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripContext {
    pub timestamp: DateTime<Utc>,
    pub weather: Weather,
    pub road_condition: RoadCondition,
}

/// Itemized fare components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FareBreakdown {
    pub base_fare: f64,
    pub distance_km: f64,
    pub distance_fare: f64,
    pub duration_minutes: f64,
    pub time_fare: f64,
    pub subtotal: f64,
    pub night_multiplier: f64,
    pub weather_multiplier: f64,
    pub road_multiplier: f64,
    pub fuel_adjustment: f64,
    /// Fare after multipliers and adjustment, before rounding
    pub raw_total: f64,
    pub total_fare: f64,
}

/// A priced trip: the fare plus the route and config it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareQuote {
    pub total_fare: f64,
    pub breakdown: FareBreakdown,
    pub route: Route,
    /// True when a provider failed and a fallback value was used
    pub approximate: bool,
    pub config_version: u64,
    pub currency: String,
}
