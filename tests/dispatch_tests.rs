// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Candidate search and dispatch bookkeeping.

use ride_dispatch::config::Config;
use ride_dispatch::models::{Availability, Category, RideStatus, VerificationStatus};
use ride_dispatch::services::DispatchMatcher;
use uuid::Uuid;

mod common;
use common::{
    create_test_state, create_test_state_with, north_of_pickup, online_driver, ride_request,
    PICKUP,
};

#[tokio::test]
async fn test_radius_and_distance_ordering() {
    let (state, _) = create_test_state();
    let far = online_driver(&state, north_of_pickup(6.0), Category::Economy);
    let mid = online_driver(&state, north_of_pickup(4.0), Category::Economy);
    let near = online_driver(&state, north_of_pickup(2.0), Category::Economy);

    let ride = state
        .rides
        .create(Uuid::new_v4(), ride_request(Category::Economy))
        .await
        .unwrap();

    let matcher = DispatchMatcher::new(state.db.clone(), 5.0, 10);
    let candidates = matcher.find_candidates(&ride);
    let ids: Vec<Uuid> = candidates.iter().map(|c| c.driver_id).collect();

    assert_eq!(ids, vec![near.driver_id, mid.driver_id]);
    assert!(!ids.contains(&far.driver_id));
    assert!((candidates[0].distance_meters - 2000.0).abs() < 20.0);
}

#[tokio::test]
async fn test_only_matching_category_online_and_approved() {
    let (state, _) = create_test_state();
    let eligible = online_driver(&state, north_of_pickup(1.0), Category::Comfort);
    online_driver(&state, north_of_pickup(0.5), Category::Economy);

    let offline = online_driver(&state, north_of_pickup(0.7), Category::Comfort);
    state
        .drivers
        .set_availability(offline.driver_id, Availability::Offline)
        .unwrap();

    let rejected = online_driver(&state, north_of_pickup(0.8), Category::Comfort);
    state
        .drivers
        .set_verification_status(rejected.driver_id, VerificationStatus::Rejected)
        .unwrap();

    let parked = online_driver(&state, north_of_pickup(0.9), Category::Comfort);
    state
        .vehicles
        .set_active(parked.driver_id, parked.vehicle_id, false)
        .unwrap();

    let ride = state
        .rides
        .create(Uuid::new_v4(), ride_request(Category::Comfort))
        .await
        .unwrap();

    let matcher = DispatchMatcher::new(state.db.clone(), 5.0, 10);
    let ids: Vec<Uuid> = matcher
        .find_candidates(&ride)
        .into_iter()
        .map(|c| c.driver_id)
        .collect();
    assert_eq!(ids, vec![eligible.driver_id]);
}

#[tokio::test]
async fn test_candidate_cap() {
    let mut config = Config::test_default();
    config.dispatch_max_candidates = 3;
    let (state, _) = create_test_state_with(config);
    for i in 0..6 {
        online_driver(&state, north_of_pickup(0.3 * (i + 1) as f64), Category::Economy);
    }

    let ride = state
        .rides
        .create(Uuid::new_v4(), ride_request(Category::Economy))
        .await
        .unwrap();

    let offered = state.rides.dispatch(ride.id).await;
    assert_eq!(offered.len(), 3);
}

#[tokio::test]
async fn test_dispatch_records_and_notifies() {
    let (state, doubles) = create_test_state();
    let driver = online_driver(&state, PICKUP, Category::Economy);
    let ride = state
        .rides
        .create(Uuid::new_v4(), ride_request(Category::Economy))
        .await
        .unwrap();

    let offered = state.rides.dispatch(ride.id).await;
    assert_eq!(offered, vec![driver.driver_id]);
    assert_eq!(
        state.db.get_ride(ride.id).unwrap().offered_to,
        vec![driver.driver_id]
    );

    let sent = doubles.notifier.sent.lock().unwrap();
    assert!(sent
        .iter()
        .any(|(ids, summary)| summary.ride_id == ride.id && ids == &vec![driver.driver_id]));
}

#[tokio::test]
async fn test_no_candidates_leaves_ride_pending() {
    let (state, doubles) = create_test_state();
    let ride = state
        .rides
        .create(Uuid::new_v4(), ride_request(Category::Xl))
        .await
        .unwrap();

    let offered = state.rides.dispatch(ride.id).await;
    assert!(offered.is_empty());
    assert_eq!(
        state.db.get_ride(ride.id).unwrap().status,
        RideStatus::Pending
    );
    assert!(doubles.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_location_updates_move_driver() {
    let (state, _) = create_test_state();
    let driver = online_driver(&state, north_of_pickup(8.0), Category::Economy);
    let ride = state
        .rides
        .create(Uuid::new_v4(), ride_request(Category::Economy))
        .await
        .unwrap();
    let matcher = DispatchMatcher::new(state.db.clone(), 5.0, 10);
    assert!(matcher.find_candidates(&ride).is_empty());

    state
        .drivers
        .report_location(driver.driver_id, north_of_pickup(1.5))
        .unwrap();
    let ids: Vec<Uuid> = matcher
        .find_candidates(&ride)
        .into_iter()
        .map(|c| c.driver_id)
        .collect();
    assert_eq!(ids, vec![driver.driver_id]);
}
