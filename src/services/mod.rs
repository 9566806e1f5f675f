// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod dispatch;
pub mod drivers;
pub mod fare;
pub mod notify;
pub mod pricing;
pub mod providers;
pub mod rides;
pub mod sweep;
pub mod vehicles;

pub use dispatch::{Candidate, DispatchMatcher};
pub use drivers::DriverDirectory;
pub use fare::FareEngine;
pub use notify::{
    InMemoryLedger, LogNotificationChannel, NotificationChannel, RideSummary, SettlementLedger,
};
pub use pricing::PricingConfigStore;
pub use providers::{
    CollaboratorError, OsrmRouter, RoadConditionProvider, RoutingProvider, StaticRoadCondition,
    StaticWeather, StraightLineRouter, TripContextResolver, WeatherProvider,
};
pub use rides::{FareEstimateRequest, LifecycleTimings, RideLifecycle, RideRequest, SweepReport};
pub use sweep::RideSweeper;
pub use vehicles::{NewVehicle, VehicleRegistry};
