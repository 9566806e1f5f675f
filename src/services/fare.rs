// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fare engine.
//!
//! Pure pricing: route + category + context + config -> fare breakdown.
//! No I/O and no hidden state, so the estimate at request time and the
//! final settlement price can both call it safely.
//!
//! Order of operations:
//! 1. distance fare = km * perKmRate[category]
//! 2. time fare = minutes * perMinuteRate
//! 3. subtotal = base + distance fare + time fare
//! 4. night multiplier from the local hour
//! 5. scaled = subtotal * night * weather * road
//! 6. final = scaled + fuel adjustment (additive, after scaling)
//! 7. total = final rounded up to the next multiple of 5

use crate::error::{AppError, Result};
use crate::models::{Category, FareBreakdown, PricingConfig, Route, TripContext};
use chrono::{FixedOffset, Offset, Timelike, Utc};

/// Fares are rounded up to a multiple of this many currency units.
pub const FARE_ROUNDING_STEP: f64 = 5.0;

pub struct FareEngine;

impl FareEngine {
    /// Price a trip.
    ///
    /// Fails with `UnsupportedCategory` when `config.per_km_rate` has no
    /// entry for `category`.
    pub fn estimate(
        route: &Route,
        category: Category,
        context: &TripContext,
        config: &PricingConfig,
    ) -> Result<FareBreakdown> {
        let per_km = *config
            .per_km_rate
            .get(&category)
            .ok_or(AppError::UnsupportedCategory(category))?;

        let distance_km = route.distance_meters.max(0.0) / 1000.0;
        let duration_minutes = route.duration_seconds.max(0.0) / 60.0;

        let distance_fare = distance_km * per_km;
        let time_fare = duration_minutes * config.per_minute_rate;
        let subtotal = config.base_fare + distance_fare + time_fare;

        let night_multiplier = if config.night.contains(local_hour(context, config)) {
            config.night.rate
        } else {
            1.0
        };
        let weather_multiplier = config
            .weather_multiplier
            .get(&context.weather)
            .copied()
            .unwrap_or(1.0);
        let road_multiplier = config
            .road_multiplier
            .get(&context.road_condition)
            .copied()
            .unwrap_or(1.0);

        let scaled = subtotal * night_multiplier * weather_multiplier * road_multiplier;

        let fuel_adjustment = config
            .fuel_adjustment
            .get(&category.fuel_type())
            .copied()
            .unwrap_or(0.0);
        let raw_total = (scaled + fuel_adjustment).max(0.0);

        Ok(FareBreakdown {
            base_fare: config.base_fare,
            distance_km,
            distance_fare,
            duration_minutes,
            time_fare,
            subtotal,
            night_multiplier,
            weather_multiplier,
            road_multiplier,
            fuel_adjustment,
            raw_total,
            total_fare: round_up_to_step(raw_total, FARE_ROUNDING_STEP),
        })
    }

    /// Platform share of a settled fare. Not part of the rounding step.
    pub fn system_commission(total_fare: f64, config: &PricingConfig) -> f64 {
        round_to_cents(total_fare * config.system_commission_rate)
    }
}

/// Hour of day (0-23) at the pricing locale.
fn local_hour(context: &TripContext, config: &PricingConfig) -> u32 {
    let offset =
        FixedOffset::east_opt(config.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    context.timestamp.with_timezone(&offset).hour()
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round up to the next multiple of `step`.
///
/// The value is first snapped to cents so float noise such as
/// 1150.0000000001 does not push an exact multiple up a whole step.
pub fn round_up_to_step(value: f64, step: f64) -> f64 {
    (round_to_cents(value) / step).ceil() * step
}
