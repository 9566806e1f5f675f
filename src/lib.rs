// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride-Dispatch: ride matching and dynamic pricing
//!
//! This crate provides the backend API that prices trips, matches ride
//! requests to nearby drivers, and drives each ride from request to
//! settlement.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::MemoryDb;
use models::{RoadCondition, Weather};
use services::{
    DispatchMatcher, DriverDirectory, InMemoryLedger, LifecycleTimings, LogNotificationChannel,
    NotificationChannel, OsrmRouter, PricingConfigStore, RideLifecycle, RideSweeper,
    RoadConditionProvider, RoutingProvider, SettlementLedger, StaticRoadCondition, StaticWeather,
    StraightLineRouter, TripContextResolver, VehicleRegistry, WeatherProvider,
};
use std::sync::Arc;
use std::time::Duration;

/// External systems the core talks to.
pub struct Collaborators {
    pub routing: Arc<dyn RoutingProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub roads: Arc<dyn RoadConditionProvider>,
    pub notifier: Arc<dyn NotificationChannel>,
    pub ledger: Arc<dyn SettlementLedger>,
    /// Delay between provider retries
    pub retry_backoff: Option<Duration>,
}

impl Collaborators {
    /// Production wiring: OSRM when `ROUTING_URL` is set, otherwise
    /// straight-line routing; fixed normal conditions; log-only
    /// notifications; in-process ledger.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let routing: Arc<dyn RoutingProvider> = match &config.routing_url {
            Some(url) => Arc::new(OsrmRouter::new(url)?),
            None => Arc::new(StraightLineRouter::default()),
        };

        Ok(Self {
            routing,
            weather: Arc::new(StaticWeather(Weather::Normal)),
            roads: Arc::new(StaticRoadCondition(RoadCondition::Good)),
            notifier: Arc::new(LogNotificationChannel),
            ledger: Arc::new(InMemoryLedger::new()),
            retry_backoff: None,
        })
    }
}

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MemoryDb,
    pub pricing: Arc<PricingConfigStore>,
    pub drivers: DriverDirectory,
    pub vehicles: VehicleRegistry,
    pub rides: RideLifecycle,
}

impl AppState {
    /// Wire services over a fresh store.
    pub fn build(config: Config, collaborators: Collaborators) -> error::Result<Self> {
        let db = MemoryDb::new();
        let pricing = Arc::new(PricingConfigStore::load(db.clone())?);
        let drivers = DriverDirectory::new(db.clone());
        let vehicles = VehicleRegistry::new(db.clone(), pricing.clone());
        let matcher = DispatchMatcher::new(
            db.clone(),
            config.dispatch_radius_km,
            config.dispatch_max_candidates,
        );

        let mut resolver = TripContextResolver::new(
            collaborators.routing,
            collaborators.weather,
            collaborators.roads,
            config.provider_max_attempts,
        );
        if let Some(backoff) = collaborators.retry_backoff {
            resolver = resolver.with_backoff(backoff);
        }

        let timings = LifecycleTimings {
            pending_ttl: to_chrono(config.pending_ride_ttl)?,
            schedule_lead: to_chrono(config.schedule_lead)?,
        };
        let rides = RideLifecycle::new(
            db.clone(),
            pricing.clone(),
            drivers.clone(),
            matcher,
            Arc::new(resolver),
            collaborators.notifier,
            collaborators.ledger,
            timings,
        );

        Ok(Self {
            config,
            db,
            pricing,
            drivers,
            vehicles,
            rides,
        })
    }

    pub fn sweeper(&self) -> RideSweeper {
        RideSweeper::new(self.rides.clone())
    }
}

fn to_chrono(duration: Duration) -> error::Result<chrono::Duration> {
    chrono::Duration::from_std(duration)
        .map_err(|e| error::AppError::Internal(anyhow::anyhow!("duration out of range: {}", e)))
}
