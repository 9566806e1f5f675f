// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod driver;
pub mod location;
pub mod pricing;
pub mod ride;
pub mod vehicle;

pub use driver::{Availability, Driver, VerificationStatus};
pub use location::{GeoPoint, Place};
pub use pricing::{
    FareBreakdown, FareQuote, NightWindow, PricingConfig, RoadCondition, Route, TripContext,
    Weather,
};
pub use ride::{
    Cancellation, CancelledBy, PaymentMethod, Ride, RideStatus, SettlementStatus,
};
pub use vehicle::{Category, FuelType, Vehicle, VehicleCondition, VehicleRates, VehicleType};
