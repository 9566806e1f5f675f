// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride lifecycle state machine.
//!
//! ```text
//! Scheduled -> Pending -> Accepted -> InProgress -> Completed
//!                 |           |
//!                 +-----------+--> Cancelled
//!                 +--> NoDriversAvailable
//! ```
//!
//! Every transition is a conditional update on the ride record
//! (`MemoryDb::update_ride`): the precondition is re-checked under the
//! record's lock, so two racing callers can never both succeed. Accept is
//! the contended one; losers get `Conflict(RideNoLongerAvailable)`.

use crate::db::MemoryDb;
use crate::error::{AppError, ConflictReason, ForbiddenReason, Result};
use crate::models::{
    Cancellation, CancelledBy, Category, Driver, FareQuote, GeoPoint,
    PaymentMethod, Place, PricingConfig, Ride, RideStatus, Route, SettlementStatus,
    TripContext, VerificationStatus,
};
use crate::services::dispatch::DispatchMatcher;
use crate::services::fare::FareEngine;
use crate::services::notify::{NotificationChannel, RideSummary, SettlementLedger};
use crate::services::providers::TripContextResolver;
use crate::services::{DriverDirectory, PricingConfigStore};
use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Pickup and destination closer than this are rejected.
const MIN_TRIP_METERS: f64 = 50.0;

const MAX_CANCEL_REASON_LEN: usize = 500;

/// Dispatches and settlement retries in flight per sweep.
const SWEEP_CONCURRENCY: usize = 8;

/// Body of a fare estimate.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FareEstimateRequest {
    #[validate(nested)]
    pub pickup: GeoPoint,
    #[validate(nested)]
    pub destination: GeoPoint,
    pub category: Category,
}

/// Body of a ride request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    #[validate(nested)]
    pub pickup: Place,
    #[validate(nested)]
    pub destination: Place,
    pub category: Category,
    pub payment_method: PaymentMethod,
    /// Future pickup time; far enough ahead makes the ride `Scheduled`
    pub scheduled_time: Option<DateTime<Utc>>,
}

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub promoted: usize,
    pub settlements_retried: usize,
}

/// Timing knobs for the lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleTimings {
    pub pending_ttl: Duration,
    pub schedule_lead: Duration,
}

#[derive(Clone)]
pub struct RideLifecycle {
    db: MemoryDb,
    pricing: Arc<PricingConfigStore>,
    drivers: DriverDirectory,
    matcher: DispatchMatcher,
    resolver: Arc<TripContextResolver>,
    notifier: Arc<dyn NotificationChannel>,
    ledger: Arc<dyn SettlementLedger>,
    timings: LifecycleTimings,
}

impl RideLifecycle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: MemoryDb,
        pricing: Arc<PricingConfigStore>,
        drivers: DriverDirectory,
        matcher: DispatchMatcher,
        resolver: Arc<TripContextResolver>,
        notifier: Arc<dyn NotificationChannel>,
        ledger: Arc<dyn SettlementLedger>,
        timings: LifecycleTimings,
    ) -> Self {
        Self {
            db,
            pricing,
            drivers,
            matcher,
            resolver,
            notifier,
            ledger,
            timings,
        }
    }

    // ─── Quotes ──────────────────────────────────────────────────

    /// Price a trip starting at `at` against the current config.
    async fn quote(
        &self,
        pickup: GeoPoint,
        destination: GeoPoint,
        category: Category,
        at: DateTime<Utc>,
    ) -> Result<FareQuote> {
        let config = self.pricing.current()?;
        // Fail before spending provider calls on an unpriceable category
        if !config.per_km_rate.contains_key(&category) {
            return Err(AppError::UnsupportedCategory(category));
        }

        let trip = self.resolver.resolve(pickup, destination, at).await;
        let breakdown = FareEngine::estimate(&trip.route, category, &trip.context, &config)?;

        Ok(FareQuote {
            total_fare: breakdown.total_fare,
            breakdown,
            route: trip.route,
            approximate: trip.approximate,
            config_version: config.version,
            currency: config.currency.clone(),
        })
    }

    pub async fn estimate_fare(&self, request: FareEstimateRequest) -> Result<FareQuote> {
        request.validate()?;
        check_trip_length(&request.pickup, &request.destination)?;
        self.quote(
            request.pickup,
            request.destination,
            request.category,
            Utc::now(),
        )
        .await
    }

    // ─── Create & Dispatch ───────────────────────────────────────

    /// Create a ride for `rider_id` and start dispatch in the background.
    ///
    /// Dispatch and notification failures are logged; they never fail
    /// the request.
    pub async fn create(&self, rider_id: Uuid, request: RideRequest) -> Result<Ride> {
        request.validate()?;
        let pickup = request.pickup.point();
        let destination = request.destination.point();
        check_trip_length(&pickup, &destination)?;

        let now = Utc::now();
        let status = match request.scheduled_time {
            Some(at) if at < now => {
                return Err(AppError::Validation(
                    "scheduledTime is in the past".to_string(),
                ))
            }
            Some(at) if at - now > self.timings.schedule_lead => RideStatus::Scheduled,
            _ => RideStatus::Pending,
        };

        // Cheap early exit; the authoritative check is the slot claim below
        if self.db.active_ride_for_rider(rider_id).is_some() {
            return Err(AppError::Conflict(ConflictReason::ActiveRideExists));
        }

        let quote = self
            .quote(
                pickup,
                destination,
                request.category,
                request.scheduled_time.unwrap_or(now),
            )
            .await?;

        let ride = Ride {
            id: Uuid::new_v4(),
            rider_id,
            driver_id: None,
            vehicle_id: None,
            pickup: request.pickup,
            destination: request.destination,
            category: request.category,
            payment_method: request.payment_method,
            status,
            estimated_fare: quote.total_fare,
            fare_breakdown: quote.breakdown,
            fare: None,
            system_commission: None,
            fare_approximate: quote.approximate,
            currency: quote.currency,
            offered_to: Vec::new(),
            cancellation: None,
            settlement: None,
            created_at: now,
            pending_since: (status == RideStatus::Pending).then_some(now),
            scheduled_time: request.scheduled_time,
            accepted_at: None,
            started_at: None,
            completed_at: None,
            updated_at: now,
        };

        let ride = self.db.insert_ride(ride)?;
        tracing::info!(
            ride_id = %ride.id,
            rider_id = %rider_id,
            status = %ride.status,
            category = %ride.category,
            estimated_fare = ride.estimated_fare,
            approximate = ride.fare_approximate,
            "Ride created"
        );

        if ride.status == RideStatus::Pending {
            let lifecycle = self.clone();
            let ride_id = ride.id;
            tokio::spawn(async move {
                lifecycle.dispatch(ride_id).await;
            });
        }

        Ok(ride)
    }

    /// Find candidates for a pending ride, record them and notify them.
    ///
    /// Returns the drivers offered the ride. An empty list leaves the ride
    /// pending until it is accepted or expires.
    pub async fn dispatch(&self, ride_id: Uuid) -> Vec<Uuid> {
        let Some(ride) = self.db.get_ride(ride_id) else {
            tracing::warn!(ride_id = %ride_id, "Dispatch for unknown ride");
            return Vec::new();
        };
        if ride.status != RideStatus::Pending {
            tracing::debug!(ride_id = %ride_id, status = %ride.status, "Ride no longer pending, skipping dispatch");
            return Vec::new();
        }

        let offered: Vec<Uuid> = self
            .matcher
            .find_candidates(&ride)
            .into_iter()
            .map(|c| c.driver_id)
            .collect();

        let recorded = self.db.update_ride(ride_id, |ride| {
            if ride.status != RideStatus::Pending {
                return Err(AppError::Conflict(ConflictReason::RideNoLongerAvailable));
            }
            ride.offered_to = offered.clone();
            ride.updated_at = Utc::now();
            Ok(())
        });
        if let Err(e) = recorded {
            tracing::debug!(ride_id = %ride_id, error = %e, "Ride changed during dispatch");
            return Vec::new();
        }

        if offered.is_empty() {
            tracing::info!(ride_id = %ride_id, "No drivers available yet");
            return offered;
        }

        let summary = RideSummary::from(&ride);
        if let Err(e) = self.notifier.notify(&offered, &summary).await {
            tracing::warn!(ride_id = %ride_id, error = %e, "Failed to notify drivers");
        }
        offered
    }

    // ─── Driver Transitions ──────────────────────────────────────

    /// Claim a pending ride for the calling driver and one of their vehicles.
    pub async fn accept(&self, user_id: Uuid, ride_id: Uuid, vehicle_id: Uuid) -> Result<Ride> {
        let driver = self.drivers.require_driver(user_id)?;
        if driver.status != VerificationStatus::Approved {
            return Err(AppError::Forbidden(ForbiddenReason::DriverNotApproved));
        }

        let vehicle = self
            .db
            .get_vehicle(vehicle_id)
            .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found", vehicle_id)))?;
        if vehicle.driver_id != driver.id {
            return Err(AppError::Forbidden(ForbiddenReason::NotVehicleOwner));
        }
        if !vehicle.is_active {
            return Err(AppError::Validation("vehicle is not active".to_string()));
        }

        let ride = self.get_ride(ride_id)?;
        if ride.status != RideStatus::Pending {
            return Err(AppError::Conflict(ConflictReason::RideNoLongerAvailable));
        }
        if ride.category != vehicle.category {
            return Err(AppError::Validation(format!(
                "ride requires a {} vehicle",
                ride.category
            )));
        }

        self.db.claim_driver_slot(driver.id, ride_id, vehicle_id)?;

        // Deactivation may have landed before the slot was visible to it
        let still_active = self.db.get_vehicle(vehicle_id).is_some_and(|v| v.is_active);
        if !still_active {
            self.db.release_driver_slot(driver.id, ride_id);
            return Err(AppError::Validation("vehicle is not active".to_string()));
        }

        let now = Utc::now();
        let accepted = self.db.update_ride(ride_id, |ride| {
            if ride.status != RideStatus::Pending {
                return Err(AppError::Conflict(ConflictReason::RideNoLongerAvailable));
            }
            ride.status = RideStatus::Accepted;
            ride.driver_id = Some(driver.id);
            ride.vehicle_id = Some(vehicle_id);
            ride.accepted_at = Some(now);
            ride.updated_at = now;
            Ok(ride.clone())
        });

        match accepted {
            Ok(ride) => {
                tracing::info!(ride_id = %ride_id, driver_id = %driver.id, vehicle_id = %vehicle_id, "Ride accepted");
                Ok(ride)
            }
            Err(e) => {
                self.db.release_driver_slot(driver.id, ride_id);
                tracing::debug!(ride_id = %ride_id, driver_id = %driver.id, error = %e, "Accept lost");
                Err(e)
            }
        }
    }

    /// Pick up the rider.
    pub async fn start(&self, user_id: Uuid, ride_id: Uuid) -> Result<Ride> {
        let driver = self.drivers.require_driver(user_id)?;
        let now = Utc::now();

        let ride = self.db.update_ride(ride_id, |ride| {
            check_driver_transition(ride, &driver, RideStatus::Accepted, "start")?;
            ride.status = RideStatus::InProgress;
            ride.started_at = Some(now);
            ride.updated_at = now;
            Ok(ride.clone())
        })?;

        tracing::info!(ride_id = %ride_id, driver_id = %driver.id, "Ride started");
        Ok(ride)
    }

    /// Finish the trip and settle the final fare.
    ///
    /// `trace` is the encoded polyline (precision 5) of the driven route.
    /// Without one the routing provider is asked for pickup -> destination.
    pub async fn complete(
        &self,
        user_id: Uuid,
        ride_id: Uuid,
        trace: Option<&str>,
    ) -> Result<Ride> {
        let driver = self.drivers.require_driver(user_id)?;
        let ride = self.get_ride(ride_id)?;
        check_driver_transition(&ride, &driver, RideStatus::InProgress, "complete")?;

        let now = Utc::now();
        let started_at = ride.started_at.unwrap_or(ride.created_at);
        let pickup = ride.pickup.point();
        let destination = ride.destination.point();

        let (route, route_approximate) = match trace {
            Some(encoded) => (route_from_trace(encoded, started_at, now)?, false),
            None => self.resolver.route(pickup, destination).await,
        };
        let (weather, road_condition, conditions_approximate) =
            self.resolver.conditions(pickup, destination).await;
        let context = TripContext {
            timestamp: started_at,
            weather,
            road_condition,
        };

        let config = self.settlement_config(&ride)?;
        let breakdown = FareEngine::estimate(&route, ride.category, &context, &config)?;
        let commission = FareEngine::system_commission(breakdown.total_fare, &config);

        let completed = self.db.update_ride(ride_id, |ride| {
            check_driver_transition(ride, &driver, RideStatus::InProgress, "complete")?;
            ride.status = RideStatus::Completed;
            ride.fare = Some(breakdown.total_fare);
            ride.system_commission = Some(commission);
            ride.fare_breakdown = breakdown.clone();
            ride.fare_approximate = route_approximate || conditions_approximate;
            ride.settlement = Some(SettlementStatus::Pending);
            ride.completed_at = Some(now);
            ride.updated_at = now;
            Ok(ride.clone())
        })?;

        self.db.release_rider_slot(completed.rider_id, ride_id);
        self.db.release_driver_slot(driver.id, ride_id);
        self.drivers.record_completed_ride(driver.id);

        tracing::info!(
            ride_id = %ride_id,
            driver_id = %driver.id,
            fare = breakdown.total_fare,
            commission,
            distance_km = breakdown.distance_km,
            approximate = completed.fare_approximate,
            "Ride completed"
        );

        Ok(self.settle(completed).await)
    }

    /// Pricing config for the final fare: current table with the assigned
    /// vehicle's own rates.
    fn settlement_config(&self, ride: &Ride) -> Result<PricingConfig> {
        let config = self.pricing.current()?;
        let vehicle = ride.vehicle_id.and_then(|id| self.db.get_vehicle(id));
        Ok(match vehicle {
            Some(vehicle) => config.with_vehicle_rates(ride.category, &vehicle.rates),
            None => (*config).clone(),
        })
    }

    /// Hand a completed ride to the ledger and record the outcome.
    async fn settle(&self, ride: Ride) -> Ride {
        let commission = ride.system_commission.unwrap_or(0.0);
        let status = match self.ledger.record_ride_transaction(&ride, commission).await {
            Ok(()) => SettlementStatus::Recorded,
            Err(e) => {
                tracing::warn!(ride_id = %ride.id, error = %e, "Settlement handoff failed");
                SettlementStatus::Failed
            }
        };

        let updated = self.db.update_ride(ride.id, |r| {
            r.settlement = Some(status);
            r.updated_at = Utc::now();
            Ok(r.clone())
        });
        match updated {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(ride_id = %ride.id, error = %e, "Failed to record settlement status");
                ride
            }
        }
    }

    // ─── Cancellation ────────────────────────────────────────────

    /// Cancel a ride.
    ///
    /// The rider may cancel while Scheduled, Pending or Accepted; the
    /// assigned driver while Accepted. No fee is charged. Cancelling an
    /// accepted ride clears the assignment and frees the driver.
    pub async fn cancel(
        &self,
        user_id: Uuid,
        ride_id: Uuid,
        reason: Option<String>,
    ) -> Result<Ride> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if reason
            .as_ref()
            .is_some_and(|r| r.len() > MAX_CANCEL_REASON_LEN)
        {
            return Err(AppError::Validation("reason is too long".to_string()));
        }

        let caller_driver = self.drivers.get_by_user(user_id);
        let now = Utc::now();

        let (ride, previous_driver) = self.db.update_ride(ride_id, |ride| {
            let by = if ride.rider_id == user_id {
                CancelledBy::Rider
            } else if caller_driver
                .as_ref()
                .is_some_and(|d| ride.is_assigned_to(d.id))
            {
                CancelledBy::Driver
            } else {
                return Err(AppError::Forbidden(ForbiddenReason::NotRideOwner));
            };

            match (by, ride.status) {
                (
                    CancelledBy::Rider,
                    RideStatus::Scheduled | RideStatus::Pending | RideStatus::Accepted,
                )
                | (CancelledBy::Driver, RideStatus::Accepted) => {}
                (_, status) => {
                    return Err(AppError::Conflict(ConflictReason::InvalidTransition {
                        status,
                        action: "cancel",
                    }))
                }
            }

            let previous_driver = ride.driver_id.take();
            ride.vehicle_id = None;
            ride.status = RideStatus::Cancelled;
            ride.cancellation = Some(Cancellation {
                by,
                actor_user_id: user_id,
                reason: reason.clone(),
                previous_driver_id: previous_driver,
                at: now,
            });
            ride.updated_at = now;
            Ok((ride.clone(), previous_driver))
        })?;

        self.db.release_rider_slot(ride.rider_id, ride_id);
        if let Some(driver_id) = previous_driver {
            self.db.release_driver_slot(driver_id, ride_id);
        }

        tracing::info!(
            ride_id = %ride_id,
            by = ?ride.cancellation.as_ref().map(|c| c.by),
            previous_driver = ?previous_driver,
            "Ride cancelled"
        );
        Ok(ride)
    }

    // ─── Reads ───────────────────────────────────────────────────

    fn get_ride(&self, ride_id: Uuid) -> Result<Ride> {
        self.db
            .get_ride(ride_id)
            .ok_or_else(|| AppError::NotFound(format!("Ride {} not found", ride_id)))
    }

    /// A ride as seen by `user_id`: the rider, the assigned driver, a
    /// driver it was offered to, or an admin.
    pub fn get_ride_for(&self, user_id: Uuid, ride_id: Uuid, is_admin: bool) -> Result<Ride> {
        let ride = self.get_ride(ride_id)?;
        if is_admin || ride.rider_id == user_id {
            return Ok(ride);
        }
        if let Some(driver) = self.drivers.get_by_user(user_id) {
            if ride.is_assigned_to(driver.id) || ride.offered_to.contains(&driver.id) {
                return Ok(ride);
            }
        }
        Err(AppError::Forbidden(ForbiddenReason::NotRideOwner))
    }

    /// The caller's non-terminal ride, as rider first, then as driver.
    pub fn active_ride(&self, user_id: Uuid) -> Option<Ride> {
        self.db.active_ride_for_rider(user_id).or_else(|| {
            self.drivers
                .get_by_user(user_id)
                .and_then(|d| self.db.active_ride_for_driver(d.id))
        })
    }

    // ─── Sweep ───────────────────────────────────────────────────

    /// Expire stale pending rides, promote due scheduled rides and retry
    /// failed settlements.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let expired = self.expire_stale_pending(now);
        let promoted = self.promote_due_scheduled(now);
        stream::iter(promoted.iter().copied())
            .for_each_concurrent(SWEEP_CONCURRENCY, |ride_id| async move {
                self.dispatch(ride_id).await;
            })
            .await;
        let settlements_retried = self.retry_failed_settlements().await;

        SweepReport {
            expired,
            promoted: promoted.len(),
            settlements_retried,
        }
    }

    fn expire_stale_pending(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.timings.pending_ttl;
        let is_stale = |ride: &Ride| {
            ride.status == RideStatus::Pending
                && ride.pending_since.unwrap_or(ride.created_at) + ttl <= now
        };

        let mut expired = 0;
        for ride in self.db.rides_where(is_stale) {
            let result = self.db.update_ride(ride.id, |ride| {
                if !is_stale(&*ride) {
                    return Err(AppError::Conflict(ConflictReason::RideNoLongerAvailable));
                }
                ride.status = RideStatus::NoDriversAvailable;
                ride.updated_at = now;
                Ok(())
            });
            if result.is_ok() {
                self.db.release_rider_slot(ride.rider_id, ride.id);
                tracing::info!(ride_id = %ride.id, "Pending ride expired without a driver");
                expired += 1;
            }
        }
        expired
    }

    fn promote_due_scheduled(&self, now: DateTime<Utc>) -> Vec<Uuid> {
        let lead = self.timings.schedule_lead;
        let is_due = |ride: &Ride| {
            ride.status == RideStatus::Scheduled
                && ride.scheduled_time.is_none_or(|at| at - lead <= now)
        };

        self.db
            .rides_where(is_due)
            .into_iter()
            .filter_map(|ride| {
                self.db
                    .update_ride(ride.id, |ride| {
                        if !is_due(&*ride) {
                            return Err(AppError::Conflict(ConflictReason::RideNoLongerAvailable));
                        }
                        ride.status = RideStatus::Pending;
                        ride.pending_since = Some(now);
                        ride.updated_at = now;
                        Ok(ride.id)
                    })
                    .ok()
            })
            .inspect(|ride_id| tracing::info!(ride_id = %ride_id, "Scheduled ride promoted"))
            .collect()
    }

    async fn retry_failed_settlements(&self) -> usize {
        let failed = self.db.rides_where(|r| {
            r.status == RideStatus::Completed && r.settlement == Some(SettlementStatus::Failed)
        });
        let count = failed.len();
        stream::iter(failed)
            .for_each_concurrent(SWEEP_CONCURRENCY, |ride| async move {
                self.settle(ride).await;
            })
            .await;
        count
    }
}

/// Shared guard for driver-initiated transitions: status first, then
/// ownership.
fn check_driver_transition(
    ride: &Ride,
    driver: &Driver,
    expected: RideStatus,
    action: &'static str,
) -> Result<()> {
    if ride.status != expected {
        return Err(AppError::Conflict(ConflictReason::InvalidTransition {
            status: ride.status,
            action,
        }));
    }
    if !ride.is_assigned_to(driver.id) {
        return Err(AppError::Forbidden(ForbiddenReason::NotAssignedDriver));
    }
    Ok(())
}

fn check_trip_length(pickup: &GeoPoint, destination: &GeoPoint) -> Result<()> {
    if pickup.distance_meters(destination) < MIN_TRIP_METERS {
        return Err(AppError::Validation(
            "pickup and destination are too close".to_string(),
        ));
    }
    Ok(())
}

/// Actual route from a driven trace: haversine length of the decoded
/// line and the time elapsed since pickup.
fn route_from_trace(encoded: &str, started_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<Route> {
    let line = polyline::decode_polyline(encoded, 5)
        .map_err(|e| AppError::Validation(format!("invalid polyline: {}", e)))?;

    let points: Vec<GeoPoint> = line.points().map(|p| GeoPoint::new(p.y(), p.x())).collect();
    if points.len() < 2 {
        return Err(AppError::Validation(
            "trace must contain at least two points".to_string(),
        ));
    }
    let distance_meters = points
        .windows(2)
        .map(|pair| pair[0].distance_meters(&pair[1]))
        .sum();

    Ok(Route {
        distance_meters,
        duration_seconds: (now - started_at).num_milliseconds().max(0) as f64 / 1000.0,
        polyline: Some(encoded.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use geo::LineString;

    #[test]
    fn test_route_from_trace() {
        let line: LineString<f64> = vec![[36.8219, -1.2921], [36.8219, -1.2831]].into();
        let encoded = polyline::encode_coordinates(line, 5).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap();
        let end = start + Duration::minutes(4);

        let route = route_from_trace(&encoded, start, end).unwrap();
        // 0.009 degrees of latitude is ~1 km
        assert!((route.distance_meters - 1000.0).abs() < 10.0);
        assert_eq!(route.duration_seconds, 240.0);
    }

    #[test]
    fn test_route_from_trace_needs_two_points() {
        let line: LineString<f64> = vec![[36.8219, -1.2921]].into();
        let encoded = polyline::encode_coordinates(line, 5).unwrap();
        let now = Utc::now();
        assert!(matches!(
            route_from_trace(&encoded, now, now),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_trip_length_guard() {
        let a = GeoPoint::new(-1.2921, 36.8219);
        let b = GeoPoint::new(-1.29211, 36.82191);
        assert!(check_trip_length(&a, &b).is_err());
        assert!(check_trip_length(&a, &GeoPoint::new(-1.30, 36.83)).is_ok());
    }
}
