// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

#![allow(dead_code)]

use async_trait::async_trait;
use ride_dispatch::config::Config;
use ride_dispatch::middleware::auth::create_jwt;
use ride_dispatch::models::{
    Availability, Category, FuelType, GeoPoint, PaymentMethod, Place, Ride, RoadCondition, Route,
    VehicleCondition, VehicleType, VerificationStatus, Weather,
};
use ride_dispatch::routes::create_router;
use ride_dispatch::services::{
    CollaboratorError, InMemoryLedger, NewVehicle, NotificationChannel, RideRequest, RideSummary,
    RoutingProvider, SettlementLedger, StaticRoadCondition, StaticWeather, StraightLineRouter,
};
use ride_dispatch::{AppState, Collaborators};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Nairobi CBD.
pub const PICKUP: GeoPoint = GeoPoint {
    lat: -1.2864,
    lng: 36.8172,
};

/// ~3.3 km north-west of `PICKUP`.
pub const DESTINATION: GeoPoint = GeoPoint {
    lat: -1.2630,
    lng: 36.8020,
};

/// A point `km` kilometers due north of `PICKUP`.
pub fn north_of_pickup(km: f64) -> GeoPoint {
    GeoPoint::new(PICKUP.lat + km / 111.195, PICKUP.lng)
}

// ─── Test doubles ────────────────────────────────────────────

/// Records every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Vec<Uuid>, RideSummary)>>,
}

#[async_trait]
impl NotificationChannel for RecordingNotifier {
    async fn notify(
        &self,
        driver_ids: &[Uuid],
        summary: &RideSummary,
    ) -> Result<(), CollaboratorError> {
        self.sent
            .lock()
            .unwrap()
            .push((driver_ids.to_vec(), summary.clone()));
        Ok(())
    }
}

/// Notification channel that is always down.
pub struct FailingNotifier;

#[async_trait]
impl NotificationChannel for FailingNotifier {
    async fn notify(&self, _: &[Uuid], _: &RideSummary) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Unavailable("push service down".to_string()))
    }
}

/// Routing provider that fails while `down` is set and counts calls.
#[derive(Default)]
pub struct SwitchableRouter {
    pub down: AtomicBool,
    pub calls: AtomicU32,
}

#[async_trait]
impl RoutingProvider for SwitchableRouter {
    async fn get_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Route, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable("routing down".to_string()));
        }
        Ok(StraightLineRouter::default().estimate(origin, destination))
    }
}

/// Ledger that fails while `down` is set, then delegates to an in-memory one.
#[derive(Default)]
pub struct SwitchableLedger {
    pub down: AtomicBool,
    pub inner: InMemoryLedger,
}

#[async_trait]
impl SettlementLedger for SwitchableLedger {
    async fn record_ride_transaction(
        &self,
        ride: &Ride,
        commission: f64,
    ) -> Result<(), CollaboratorError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable("ledger down".to_string()));
        }
        self.inner.record_ride_transaction(ride, commission).await
    }
}

// ─── App construction ────────────────────────────────────────

/// Handles to the doubles wired into a test app.
pub struct TestDoubles {
    pub router: Arc<SwitchableRouter>,
    pub notifier: Arc<RecordingNotifier>,
    pub ledger: Arc<SwitchableLedger>,
}

pub fn test_collaborators() -> (Collaborators, TestDoubles) {
    let doubles = TestDoubles {
        router: Arc::new(SwitchableRouter::default()),
        notifier: Arc::new(RecordingNotifier::default()),
        ledger: Arc::new(SwitchableLedger::default()),
    };
    let collaborators = Collaborators {
        routing: doubles.router.clone(),
        weather: Arc::new(StaticWeather(Weather::Normal)),
        roads: Arc::new(StaticRoadCondition(RoadCondition::Good)),
        notifier: doubles.notifier.clone(),
        ledger: doubles.ledger.clone(),
        retry_backoff: Some(Duration::ZERO),
    };
    (collaborators, doubles)
}

/// Offline state with test doubles.
pub fn create_test_state_with(config: Config) -> (Arc<AppState>, TestDoubles) {
    let (collaborators, doubles) = test_collaborators();
    let state = AppState::build(config, collaborators).expect("state should build");
    (Arc::new(state), doubles)
}

pub fn create_test_state() -> (Arc<AppState>, TestDoubles) {
    create_test_state_with(Config::test_default())
}

/// Offline state whose notification channel is always down.
pub fn create_test_state_with_failing_notifier() -> Arc<AppState> {
    let (mut collaborators, _) = test_collaborators();
    collaborators.notifier = Arc::new(FailingNotifier);
    let state =
        AppState::build(Config::test_default(), collaborators).expect("state should build");
    Arc::new(state)
}

/// Create a test app with offline dependencies.
/// Returns the router and the shared state.
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let (state, _) = create_test_state();
    (create_router(state.clone()), state)
}

pub fn create_test_jwt(user_id: Uuid, admin: bool, state: &AppState) -> String {
    create_jwt(user_id, admin, &state.config.jwt_signing_key).expect("jwt")
}

// ─── Fixtures ────────────────────────────────────────────────

pub fn place(point: GeoPoint, address: &str) -> Place {
    Place {
        address: address.to_string(),
        lat: point.lat,
        lng: point.lng,
    }
}

pub fn ride_request(category: Category) -> RideRequest {
    RideRequest {
        pickup: place(PICKUP, "Kenyatta Avenue"),
        destination: place(DESTINATION, "Westlands"),
        category,
        payment_method: PaymentMethod::MobileMoney,
        scheduled_time: None,
    }
}

pub fn new_vehicle(category: Category) -> NewVehicle {
    let plate = format!("KD{}", &Uuid::new_v4().simple().to_string()[..6]);
    NewVehicle {
        category,
        vehicle_type: VehicleType::Sedan,
        plate,
        make: "Toyota".to_string(),
        model: "Prius".to_string(),
        capacity: 4,
        fuel_type: if category == Category::Green {
            FuelType::Electric
        } else {
            FuelType::Hybrid
        },
        condition: VehicleCondition::Good,
        image_url: Some("uploads/vehicle.jpg".to_string()),
    }
}

/// A driver ready for dispatch.
#[derive(Debug, Clone, Copy)]
pub struct TestDriver {
    pub user_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
}

/// Approved, online driver at `location` with one active vehicle in `category`.
pub fn online_driver(state: &AppState, location: GeoPoint, category: Category) -> TestDriver {
    let user_id = Uuid::new_v4();
    let driver = state
        .drivers
        .apply_as_driver(
            user_id,
            BTreeMap::from([("license".to_string(), "uploads/license.pdf".to_string())]),
        )
        .unwrap();
    state
        .drivers
        .set_verification_status(driver.id, VerificationStatus::Approved)
        .unwrap();
    state
        .drivers
        .set_availability(driver.id, Availability::Online)
        .unwrap();
    state.drivers.report_location(driver.id, location).unwrap();
    let vehicle = state
        .vehicles
        .register_vehicle(user_id, new_vehicle(category))
        .unwrap();

    TestDriver {
        user_id,
        driver_id: driver.id,
        vehicle_id: vehicle.id,
    }
}
